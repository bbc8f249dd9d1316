//! ISO 3166-1 alpha-2 country codes attached to substations.
//!
//! Country filters in contingency lists are parsed into [`Country`] so that a
//! misspelled code is rejected when the list is built instead of silently
//! never matching at evaluation time.

use crate::error::GatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! countries {
    ($($code:ident => $name:literal),+ $(,)?) => {
        /// Country of a substation, identified by its ISO 3166-1 alpha-2 code.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Country {
            $($code),+
        }

        impl Country {
            /// Every known country, in declaration order.
            pub const ALL: &'static [Country] = &[$(Country::$code),+];

            /// Two-letter code, e.g. `"FR"`.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Country::$code => stringify!($code)),+
                }
            }

            /// English short name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Country::$code => $name),+
                }
            }
        }

        impl FromStr for Country {
            type Err = GatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $(stringify!($code) => Ok(Country::$code),)+
                    other => Err(GatError::Validation(format!(
                        "unknown country code '{other}'"
                    ))),
                }
            }
        }
    };
}

countries! {
    AD => "Andorra",
    AE => "United Arab Emirates",
    AF => "Afghanistan",
    AG => "Antigua and Barbuda",
    AI => "Anguilla",
    AL => "Albania",
    AM => "Armenia",
    AO => "Angola",
    AQ => "Antarctica",
    AR => "Argentina",
    AS => "American Samoa",
    AT => "Austria",
    AU => "Australia",
    AW => "Aruba",
    AX => "Åland Islands",
    AZ => "Azerbaijan",
    BA => "Bosnia and Herzegovina",
    BB => "Barbados",
    BD => "Bangladesh",
    BE => "Belgium",
    BF => "Burkina Faso",
    BG => "Bulgaria",
    BH => "Bahrain",
    BI => "Burundi",
    BJ => "Benin",
    BL => "Saint Barthélemy",
    BM => "Bermuda",
    BN => "Brunei",
    BO => "Bolivia",
    BQ => "Caribbean Netherlands",
    BR => "Brazil",
    BS => "Bahamas",
    BT => "Bhutan",
    BV => "Bouvet Island",
    BW => "Botswana",
    BY => "Belarus",
    BZ => "Belize",
    CA => "Canada",
    CC => "Cocos (Keeling) Islands",
    CD => "DR Congo",
    CF => "Central African Republic",
    CG => "Republic of the Congo",
    CH => "Switzerland",
    CI => "Côte d'Ivoire",
    CK => "Cook Islands",
    CL => "Chile",
    CM => "Cameroon",
    CN => "China",
    CO => "Colombia",
    CR => "Costa Rica",
    CU => "Cuba",
    CV => "Cabo Verde",
    CW => "Curaçao",
    CX => "Christmas Island",
    CY => "Cyprus",
    CZ => "Czechia",
    DE => "Germany",
    DJ => "Djibouti",
    DK => "Denmark",
    DM => "Dominica",
    DO => "Dominican Republic",
    DZ => "Algeria",
    EC => "Ecuador",
    EE => "Estonia",
    EG => "Egypt",
    EH => "Western Sahara",
    ER => "Eritrea",
    ES => "Spain",
    ET => "Ethiopia",
    FI => "Finland",
    FJ => "Fiji",
    FK => "Falkland Islands",
    FM => "Micronesia",
    FO => "Faroe Islands",
    FR => "France",
    GA => "Gabon",
    GB => "United Kingdom",
    GD => "Grenada",
    GE => "Georgia",
    GF => "French Guiana",
    GG => "Guernsey",
    GH => "Ghana",
    GI => "Gibraltar",
    GL => "Greenland",
    GM => "Gambia",
    GN => "Guinea",
    GP => "Guadeloupe",
    GQ => "Equatorial Guinea",
    GR => "Greece",
    GS => "South Georgia and the South Sandwich Islands",
    GT => "Guatemala",
    GU => "Guam",
    GW => "Guinea-Bissau",
    GY => "Guyana",
    HK => "Hong Kong",
    HM => "Heard Island and McDonald Islands",
    HN => "Honduras",
    HR => "Croatia",
    HT => "Haiti",
    HU => "Hungary",
    ID => "Indonesia",
    IE => "Ireland",
    IL => "Israel",
    IM => "Isle of Man",
    IN => "India",
    IO => "British Indian Ocean Territory",
    IQ => "Iraq",
    IR => "Iran",
    IS => "Iceland",
    IT => "Italy",
    JE => "Jersey",
    JM => "Jamaica",
    JO => "Jordan",
    JP => "Japan",
    KE => "Kenya",
    KG => "Kyrgyzstan",
    KH => "Cambodia",
    KI => "Kiribati",
    KM => "Comoros",
    KN => "Saint Kitts and Nevis",
    KP => "North Korea",
    KR => "South Korea",
    KW => "Kuwait",
    KY => "Cayman Islands",
    KZ => "Kazakhstan",
    LA => "Laos",
    LB => "Lebanon",
    LC => "Saint Lucia",
    LI => "Liechtenstein",
    LK => "Sri Lanka",
    LR => "Liberia",
    LS => "Lesotho",
    LT => "Lithuania",
    LU => "Luxembourg",
    LV => "Latvia",
    LY => "Libya",
    MA => "Morocco",
    MC => "Monaco",
    MD => "Moldova",
    ME => "Montenegro",
    MF => "Saint Martin",
    MG => "Madagascar",
    MH => "Marshall Islands",
    MK => "North Macedonia",
    ML => "Mali",
    MM => "Myanmar",
    MN => "Mongolia",
    MO => "Macao",
    MP => "Northern Mariana Islands",
    MQ => "Martinique",
    MR => "Mauritania",
    MS => "Montserrat",
    MT => "Malta",
    MU => "Mauritius",
    MV => "Maldives",
    MW => "Malawi",
    MX => "Mexico",
    MY => "Malaysia",
    MZ => "Mozambique",
    NA => "Namibia",
    NC => "New Caledonia",
    NE => "Niger",
    NF => "Norfolk Island",
    NG => "Nigeria",
    NI => "Nicaragua",
    NL => "Netherlands",
    NO => "Norway",
    NP => "Nepal",
    NR => "Nauru",
    NU => "Niue",
    NZ => "New Zealand",
    OM => "Oman",
    PA => "Panama",
    PE => "Peru",
    PF => "French Polynesia",
    PG => "Papua New Guinea",
    PH => "Philippines",
    PK => "Pakistan",
    PL => "Poland",
    PM => "Saint Pierre and Miquelon",
    PN => "Pitcairn Islands",
    PR => "Puerto Rico",
    PS => "Palestine",
    PT => "Portugal",
    PW => "Palau",
    PY => "Paraguay",
    QA => "Qatar",
    RE => "Réunion",
    RO => "Romania",
    RS => "Serbia",
    RU => "Russia",
    RW => "Rwanda",
    SA => "Saudi Arabia",
    SB => "Solomon Islands",
    SC => "Seychelles",
    SD => "Sudan",
    SE => "Sweden",
    SG => "Singapore",
    SH => "Saint Helena, Ascension and Tristan da Cunha",
    SI => "Slovenia",
    SJ => "Svalbard and Jan Mayen",
    SK => "Slovakia",
    SL => "Sierra Leone",
    SM => "San Marino",
    SN => "Senegal",
    SO => "Somalia",
    SR => "Suriname",
    SS => "South Sudan",
    ST => "São Tomé and Príncipe",
    SV => "El Salvador",
    SX => "Sint Maarten",
    SY => "Syria",
    SZ => "Eswatini",
    TC => "Turks and Caicos Islands",
    TD => "Chad",
    TF => "French Southern Territories",
    TG => "Togo",
    TH => "Thailand",
    TJ => "Tajikistan",
    TK => "Tokelau",
    TL => "Timor-Leste",
    TM => "Turkmenistan",
    TN => "Tunisia",
    TO => "Tonga",
    TR => "Turkey",
    TT => "Trinidad and Tobago",
    TV => "Tuvalu",
    TW => "Taiwan",
    TZ => "Tanzania",
    UA => "Ukraine",
    UG => "Uganda",
    UM => "United States Minor Outlying Islands",
    US => "United States",
    UY => "Uruguay",
    UZ => "Uzbekistan",
    VA => "Vatican City",
    VC => "Saint Vincent and the Grenadines",
    VE => "Venezuela",
    VG => "British Virgin Islands",
    VI => "U.S. Virgin Islands",
    VN => "Vietnam",
    VU => "Vanuatu",
    WF => "Wallis and Futuna",
    WS => "Samoa",
    XK => "Kosovo",
    YE => "Yemen",
    YT => "Mayotte",
    ZA => "South Africa",
    ZM => "Zambia",
    ZW => "Zimbabwe",
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
