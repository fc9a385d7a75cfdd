//! Country name and code conversion.
//!
//! The `CountryLookup` trait is the seam; `CountryTable` is the built-in
//! implementation covering the nations that appear in professional cycling
//! results, including historical ones (USSR, GDR, Yugoslavia,
//! Czechoslovakia). Names, aliases, ISO2 and ISO3 codes all resolve,
//! case-insensitively, with `-`/`_` treated as spaces so url slugs work.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Target code space for a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSpace {
    Iso2,
    Iso3,
    /// Three-digit ISO 3166-1 numeric code, zero padded ("056")
    IsoNumeric,
    ShortName,
}

impl fmt::Display for CodeSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeSpace::Iso2 => write!(f, "ISO2"),
            CodeSpace::Iso3 => write!(f, "ISO3"),
            CodeSpace::IsoNumeric => write!(f, "ISOnumeric"),
            CodeSpace::ShortName => write!(f, "name_short"),
        }
    }
}

pub trait CountryLookup {
    /// Convert a country name or code; None when the country is unknown
    fn convert(&self, name: &str, to: CodeSpace) -> Option<String>;

    /// Convert, falling back to the input string on a miss so that
    /// downstream joins stay resolvable
    fn convert_or_name(&self, name: &str, to: CodeSpace) -> String {
        self.convert(name, to).unwrap_or_else(|| name.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
struct Country {
    name: &'static str,
    iso2: &'static str,
    iso3: &'static str,
    numeric: &'static str,
    aliases: &'static [&'static str],
}

const fn c(
    name: &'static str,
    iso2: &'static str,
    iso3: &'static str,
    numeric: &'static str,
    aliases: &'static [&'static str],
) -> Country {
    Country {
        name,
        iso2,
        iso3,
        numeric,
        aliases,
    }
}

static COUNTRIES: &[Country] = &[
    c("Albania", "AL", "ALB", "008", &[]),
    c("Algeria", "DZ", "DZA", "012", &[]),
    c("Andorra", "AD", "AND", "020", &[]),
    c("Argentina", "AR", "ARG", "032", &[]),
    c("Armenia", "AM", "ARM", "051", &[]),
    c("Australia", "AU", "AUS", "036", &[]),
    c("Austria", "AT", "AUT", "040", &[]),
    c("Azerbaijan", "AZ", "AZE", "031", &[]),
    c("Bahrain", "BH", "BHR", "048", &[]),
    c("Belarus", "BY", "BLR", "112", &[]),
    c("Belgium", "BE", "BEL", "056", &["Belgique", "België"]),
    c("Bolivia", "BO", "BOL", "068", &[]),
    c("Bosnia and Herzegovina", "BA", "BIH", "070", &["Bosnia", "Bosnia-Herzegovina"]),
    c("Brazil", "BR", "BRA", "076", &["Brasil"]),
    c("Bulgaria", "BG", "BGR", "100", &[]),
    c("Burkina Faso", "BF", "BFA", "854", &[]),
    c("Cameroon", "CM", "CMR", "120", &[]),
    c("Canada", "CA", "CAN", "124", &[]),
    c("Chile", "CL", "CHL", "152", &[]),
    c("China", "CN", "CHN", "156", &[]),
    c("Colombia", "CO", "COL", "170", &[]),
    c("Costa Rica", "CR", "CRI", "188", &[]),
    c("Croatia", "HR", "HRV", "191", &[]),
    c("Cuba", "CU", "CUB", "192", &[]),
    c("Cyprus", "CY", "CYP", "196", &[]),
    c("Czechia", "CZ", "CZE", "203", &["Czech Republic"]),
    c("Czechoslovakia", "CS", "CSK", "200", &[]),
    c("Denmark", "DK", "DNK", "208", &[]),
    c("Dominican Republic", "DO", "DOM", "214", &[]),
    c("East Germany", "DD", "DDR", "278", &["German Democratic Republic", "GDR"]),
    c("Ecuador", "EC", "ECU", "218", &[]),
    c("Egypt", "EG", "EGY", "818", &[]),
    c("El Salvador", "SV", "SLV", "222", &[]),
    c("Eritrea", "ER", "ERI", "232", &[]),
    c("Estonia", "EE", "EST", "233", &[]),
    c("Ethiopia", "ET", "ETH", "231", &[]),
    c("Finland", "FI", "FIN", "246", &[]),
    c("France", "FR", "FRA", "250", &[]),
    c("Georgia", "GE", "GEO", "268", &[]),
    c("Germany", "DE", "DEU", "276", &["West Germany", "Deutschland"]),
    c("Greece", "GR", "GRC", "300", &[]),
    c("Guatemala", "GT", "GTM", "320", &[]),
    c("Hong Kong", "HK", "HKG", "344", &[]),
    c("Hungary", "HU", "HUN", "348", &[]),
    c("Iceland", "IS", "ISL", "352", &[]),
    c("India", "IN", "IND", "356", &[]),
    c("Indonesia", "ID", "IDN", "360", &[]),
    c("Iran", "IR", "IRN", "364", &[]),
    c("Ireland", "IE", "IRL", "372", &[]),
    c("Israel", "IL", "ISR", "376", &[]),
    c("Italy", "IT", "ITA", "380", &["Italia"]),
    c("Japan", "JP", "JPN", "392", &[]),
    c("Kazakhstan", "KZ", "KAZ", "398", &[]),
    c("Kenya", "KE", "KEN", "404", &[]),
    c("Latvia", "LV", "LVA", "428", &[]),
    c("Liechtenstein", "LI", "LIE", "438", &[]),
    c("Lithuania", "LT", "LTU", "440", &[]),
    c("Luxembourg", "LU", "LUX", "442", &[]),
    c("Malaysia", "MY", "MYS", "458", &[]),
    c("Malta", "MT", "MLT", "470", &[]),
    c("Mexico", "MX", "MEX", "484", &[]),
    c("Moldova", "MD", "MDA", "498", &[]),
    c("Monaco", "MC", "MCO", "492", &[]),
    c("Mongolia", "MN", "MNG", "496", &[]),
    c("Montenegro", "ME", "MNE", "499", &[]),
    c("Morocco", "MA", "MAR", "504", &[]),
    c("Namibia", "NA", "NAM", "516", &[]),
    c("Netherlands", "NL", "NLD", "528", &["The Netherlands", "Holland", "Nederland"]),
    c("New Zealand", "NZ", "NZL", "554", &[]),
    c("North Macedonia", "MK", "MKD", "807", &["Macedonia"]),
    c("Norway", "NO", "NOR", "578", &[]),
    c("Panama", "PA", "PAN", "591", &[]),
    c("Paraguay", "PY", "PRY", "600", &[]),
    c("Peru", "PE", "PER", "604", &[]),
    c("Philippines", "PH", "PHL", "608", &[]),
    c("Poland", "PL", "POL", "616", &[]),
    c("Portugal", "PT", "PRT", "620", &[]),
    c("Puerto Rico", "PR", "PRI", "630", &[]),
    c("Romania", "RO", "ROU", "642", &[]),
    c("Russia", "RU", "RUS", "643", &["Russian Federation"]),
    c("Rwanda", "RW", "RWA", "646", &[]),
    c("San Marino", "SM", "SMR", "674", &[]),
    c("Serbia", "RS", "SRB", "688", &[]),
    c("Singapore", "SG", "SGP", "702", &[]),
    c("Slovakia", "SK", "SVK", "703", &[]),
    c("Slovenia", "SI", "SVN", "705", &[]),
    c("South Africa", "ZA", "ZAF", "710", &[]),
    c("South Korea", "KR", "KOR", "410", &["Korea", "Republic of Korea"]),
    c("Soviet Union", "SU", "SUN", "810", &["USSR"]),
    c("Spain", "ES", "ESP", "724", &["España"]),
    c("Sweden", "SE", "SWE", "752", &[]),
    c("Switzerland", "CH", "CHE", "756", &[]),
    c("Taiwan", "TW", "TWN", "158", &[]),
    c("Thailand", "TH", "THA", "764", &[]),
    c("Tunisia", "TN", "TUN", "788", &[]),
    c("Turkey", "TR", "TUR", "792", &["Türkiye"]),
    c("Uganda", "UG", "UGA", "800", &[]),
    c("Ukraine", "UA", "UKR", "804", &[]),
    c("United Arab Emirates", "AE", "ARE", "784", &["UAE"]),
    c("United Kingdom", "GB", "GBR", "826", &["Great Britain", "UK", "Britain", "England"]),
    c("United States", "US", "USA", "840", &["United States of America"]),
    c("Uruguay", "UY", "URY", "858", &[]),
    c("Uzbekistan", "UZ", "UZB", "860", &[]),
    c("Venezuela", "VE", "VEN", "862", &[]),
    c("Vietnam", "VN", "VNM", "704", &["Viet Nam"]),
    c("Yugoslavia", "YU", "YUG", "891", &[]),
];

fn lookup_key(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Built-in country table
pub struct CountryTable {
    index: HashMap<String, usize>,
}

static BUILTIN: OnceLock<CountryTable> = OnceLock::new();

impl CountryTable {
    pub fn new() -> Self {
        let mut index = HashMap::new();
        for (i, country) in COUNTRIES.iter().enumerate() {
            let keys = [country.name, country.iso2, country.iso3]
                .into_iter()
                .chain(country.aliases.iter().copied());
            for key in keys {
                index.entry(lookup_key(key)).or_insert(i);
            }
        }
        Self { index }
    }

    /// Shared instance, built on first use
    pub fn builtin() -> &'static CountryTable {
        BUILTIN.get_or_init(CountryTable::new)
    }

    pub fn len(&self) -> usize {
        COUNTRIES.len()
    }

    pub fn is_empty(&self) -> bool {
        COUNTRIES.is_empty()
    }
}

impl Default for CountryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryLookup for CountryTable {
    fn convert(&self, name: &str, to: CodeSpace) -> Option<String> {
        let country = COUNTRIES[*self.index.get(&lookup_key(name))?];
        let code = match to {
            CodeSpace::Iso2 => country.iso2,
            CodeSpace::Iso3 => country.iso3,
            CodeSpace::IsoNumeric => country.numeric,
            CodeSpace::ShortName => country.name,
        };
        Some(code.to_string())
    }
}
