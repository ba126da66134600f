use crate::prelude::{eprintln, *};
use pizza_core::address::ServiceMethod;
use pizza_core::country::{Country, Urls};
use pizza_core::customer::{Customer, CustomerRecord};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub country: Option<Country>,
    pub lang: Option<String>,
    pub service: Option<ServiceMethod>,
    pub order_host: Option<String>,
    pub tracker_host: Option<String>,
    pub customer: Option<CustomerRecord>,
}

/// Effective configuration: defaults, then the config file, then env/flags
#[derive(Debug, Clone)]
pub struct PizzaConfig {
    pub country: Country,
    pub lang: String,
    pub service: ServiceMethod,
    pub order_host: Option<String>,
    pub tracker_host: Option<String>,
    pub customer: Option<Customer>,
}

impl Default for PizzaConfig {
    fn default() -> Self {
        Self {
            country: Country::default(),
            lang: "en".to_string(),
            service: ServiceMethod::default(),
            order_host: None,
            tracker_host: None,
            customer: None,
        }
    }
}

impl PizzaConfig {
    /// `<config_dir>/pizza/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("pizza").join("config.toml"))
    }

    /// Load configuration for a command run
    ///
    /// An explicit `--config` path must exist; the default path is optional.
    pub fn load(global: &crate::Global) -> Result<Self> {
        let file = match &global.config {
            Some(path) => read_config_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        let config = Self::resolve(file, global)?;

        if global.verbose {
            eprintln!("Country: {}", config.country);
            eprintln!("Language: {}", config.lang);
            eprintln!("Service: {}", config.service);
            eprintln!("Ordering API: {}", config.urls().order_host());
            eprintln!("Tracker API: {}", config.urls().tracker_host());
            eprintln!();
        }

        Ok(config)
    }

    /// Layer env/flag values from `global` over the config file
    pub fn resolve(file: ConfigFile, global: &crate::Global) -> Result<Self> {
        let defaults = Self::default();

        let country = match &global.country {
            Some(code) => code.parse()?,
            None => file.country.unwrap_or(defaults.country),
        };
        let service = match &global.service {
            Some(method) => method.parse()?,
            None => file.service.unwrap_or(defaults.service),
        };

        Ok(Self {
            country,
            lang: global.lang.clone().or(file.lang).unwrap_or(defaults.lang),
            service,
            order_host: global.order_host.clone().or(file.order_host),
            tracker_host: global.tracker_host.clone().or(file.tracker_host),
            customer: file
                .customer
                .map(|record| record.into_customer(country))
                .transpose()?,
        })
    }

    pub fn urls(&self) -> Urls {
        Urls::new(self.country).with_hosts(self.order_host.clone(), self.tracker_host.clone())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let text = fs::read_to_string(path)
        .with_context(|| f!("Failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| f!("Invalid config file {}", path.display()))
}

pub fn parse_config(text: &str) -> Result<ConfigFile> {
    toml::from_str(text).map_err(|e| Error::Config(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Global;

    #[test]
    fn test_defaults() {
        let config = PizzaConfig::resolve(ConfigFile::default(), &Global::default()).unwrap();

        assert_eq!(config.country, Country::Us);
        assert_eq!(config.lang, "en");
        assert_eq!(config.service, ServiceMethod::Delivery);
        assert_eq!(config.urls().order_host(), "https://order.dominos.com");
        assert!(config.customer.is_none());
    }

    #[test]
    fn test_file_values() {
        let file = parse_config(
            r#"
country = "ca"
lang = "fr"
service = "Carryout"
order_host = "http://localhost:9000"

[customer]
first_name = "Jane"
last_name = "Doe"
email = "jane@example.com"
phone = "5551234567"
address = "290 Bremner Blvd, Toronto, ON, M5V 3L9, ca"
"#,
        )
        .unwrap();

        let config = PizzaConfig::resolve(file, &Global::default()).unwrap();

        assert_eq!(config.country, Country::Ca);
        assert_eq!(config.lang, "fr");
        assert_eq!(config.service, ServiceMethod::Carryout);
        assert_eq!(config.urls().order_host(), "http://localhost:9000");
        assert_eq!(config.urls().tracker_host(), "https://trkweb.dominos.ca");
        assert_eq!(config.customer.unwrap().first_name, "Jane");
    }

    #[test]
    fn test_file_customer_uses_configured_country() {
        let file = parse_config(
            r#"
country = "ca"

[customer]
first_name = "Jane"
address = "290 Bremner Blvd, Toronto, ON, M5V 3L9"
"#,
        )
        .unwrap();

        let config = PizzaConfig::resolve(file, &Global::default()).unwrap();

        assert_eq!(config.customer.unwrap().address.country, Country::Ca);
    }

    #[test]
    fn test_flags_override_file() {
        let file = parse_config("country = \"ca\"\nlang = \"fr\"\n").unwrap();
        let global = Global {
            country: Some("us".to_string()),
            service: Some("carryout".to_string()),
            ..Global::default()
        };

        let config = PizzaConfig::resolve(file, &global).unwrap();

        assert_eq!(config.country, Country::Us);
        assert_eq!(config.lang, "fr");
        assert_eq!(config.service, ServiceMethod::Carryout);
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_config("country = \"mx\"").is_err());

        let global = Global {
            country: Some("mx".to_string()),
            ..Global::default()
        };
        assert!(PizzaConfig::resolve(ConfigFile::default(), &global).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "lang = \"es\"\n").unwrap();
        let global = Global {
            config: Some(path),
            ..Global::default()
        };

        let config = PizzaConfig::load(&global).unwrap();

        assert_eq!(config.lang, "es");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let global = Global {
            config: Some(PathBuf::from("/nonexistent/pizza/config.toml")),
            ..Global::default()
        };

        assert!(PizzaConfig::load(&global).is_err());
    }
}
