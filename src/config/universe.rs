// src/config/universe.rs
//! Tracked universe: sector keyword sets, companies, regional keywords and
//! optional lexicon overrides. Static per process, injectable without code changes.
//!
//! Lookup order for [`UniverseConfig::load_default`]:
//! 1) `$UNIVERSE_CONFIG_PATH`
//! 2) `config/universe.toml`
//! 3) built-in seed

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sectors::SectorDefinition;
use crate::suggest::CompanyDefinition;

pub const ENV_UNIVERSE_CONFIG_PATH: &str = "UNIVERSE_CONFIG_PATH";
pub const DEFAULT_UNIVERSE_CONFIG_PATH: &str = "config/universe.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    #[serde(default)]
    pub sectors: Vec<SectorDefinition>,
    #[serde(default)]
    pub companies: Vec<CompanyDefinition>,
    #[serde(default)]
    pub regional_keywords: Vec<String>,
    #[serde(default)]
    pub lexicon: HashMap<String, i32>,
}

impl UniverseConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: UniverseConfig = toml::from_str(s).context("parsing universe toml")?;
        cfg.cleaned()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading universe config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading universe config {}", path.display()))
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_UNIVERSE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_UNIVERSE_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_UNIVERSE_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default_seed())
    }

    /// Trim and dedupe keywords, then reject ambiguous entries.
    fn cleaned(mut self) -> Result<Self> {
        for s in &mut self.sectors {
            s.name = s.name.trim().to_string();
            s.keywords = clean_list(std::mem::take(&mut s.keywords));
        }
        for c in &mut self.companies {
            c.display_name = c.display_name.trim().to_string();
            c.ticker = c.ticker.trim().to_string();
        }
        self.regional_keywords = clean_list(std::mem::take(&mut self.regional_keywords));

        let mut names = HashSet::new();
        for s in &self.sectors {
            if s.name.is_empty() {
                bail!("sector with empty name");
            }
            if !names.insert(s.name.to_lowercase()) {
                bail!("duplicate sector `{}`", s.name);
            }
        }
        let mut tickers = HashSet::new();
        for c in &self.companies {
            if c.display_name.is_empty() || c.ticker.is_empty() {
                bail!("company entries need both display_name and ticker");
            }
            if !tickers.insert(c.ticker.to_uppercase()) {
                bail!("duplicate ticker `{}`", c.ticker);
            }
        }
        Ok(self)
    }

    /// Built-in universe used when no config file is present.
    pub fn default_seed() -> Self {
        let sectors = vec![
            SectorDefinition::new(
                "Energy",
                &["oil", "crude", "gas", "opec", "energy", "power", "coal", "solar", "renewable"],
            ),
            SectorDefinition::new(
                "Technology",
                &["IT", "tech", "technology", "software", "AI", "semiconductor", "chip", "chips", "cloud"],
            ),
            SectorDefinition::new(
                "Banking & Finance",
                &["bank", "banks", "banking", "finance", "loan", "loans", "RBI", "Fed", "interest rate", "credit"],
            ),
            SectorDefinition::new(
                "Healthcare",
                &["pharma", "healthcare", "hospital", "drug", "drugs", "vaccine", "biotech"],
            ),
            SectorDefinition::new(
                "Automobile",
                &["auto", "automaker", "car", "cars", "EV", "vehicle", "vehicles"],
            ),
            SectorDefinition::new(
                "Consumer",
                &["FMCG", "consumer", "retail", "food", "beverage"],
            ),
            SectorDefinition::new(
                "Infrastructure",
                &["infrastructure", "cement", "steel", "construction", "real estate", "housing"],
            ),
        ];
        let companies = vec![
            CompanyDefinition::new("Reliance", "RELIANCE"),
            CompanyDefinition::new("Tata Consultancy Services", "TCS"),
            CompanyDefinition::new("Infosys", "INFY"),
            CompanyDefinition::new("HDFC Bank", "HDFCBANK"),
            CompanyDefinition::new("ICICI Bank", "ICICIBANK"),
            CompanyDefinition::new("Tata Motors", "TATAMOTORS"),
            CompanyDefinition::new("Apple", "AAPL"),
            CompanyDefinition::new("Tesla", "TSLA"),
            CompanyDefinition::new("Microsoft", "MSFT"),
            CompanyDefinition::new("Alphabet", "GOOGL"),
            CompanyDefinition::new("Amazon", "AMZN"),
            CompanyDefinition::new("Nvidia", "NVDA"),
        ];
        let regional_keywords = [
            "india", "nse", "sensex", "nifty", "rbi", "mumbai", "inr", "reliance", "tata", "infosys",
            "hdfc", "icici",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            sectors,
            companies,
            regional_keywords,
            lexicon: HashMap::new(),
        }
    }
}

/// Trim, drop blanks, dedupe case-insensitively, keep first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|it| it.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}
