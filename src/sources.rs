//! # Source Registry
//!
//! Maps human-readable source names to feed URLs and carries the two static
//! catalogs handed to the presentation layer: the source list and the
//! keyword list with its compound-keyword aliases.
//!
//! - Loads from a JSON config file (sources + keywords + aliases).
//! - Falls back to a built-in `default_seed()` with the full production
//!   source set when no config is present or it fails to parse.
//! - Each source carries an explicit `time_basis`: structured timestamps
//!   from most feeds are naive local wall time, but a few report UTC. The
//!   exception lives in this table, not in the pipeline.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// How a source's structured timestamps are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    /// Structured timestamps are UTC and get shifted to the target offset.
    Utc,
    /// Structured timestamps are already target-local wall time.
    #[default]
    Local,
}

/// One registered feed. Identity is the name; immutable after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub time_basis: TimeBasis,
}

/// The full registry: sources plus the keyword catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Compound keywords standing for several search tokens,
    /// e.g. "ccs/ccus" matching on either half.
    #[serde(default)]
    pub keyword_aliases: HashMap<String, Vec<String>>,
}

impl Registry {
    /// Load the registry from a JSON file.
    /// Falls back to `default_seed()` on a missing or malformed file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Source names in registry order, for the presentation catalog.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    /// Built-in seed with the production source set and keyword catalog.
    pub fn default_seed() -> Self {
        let mut sources: Vec<Source> = [
            ("Energetyka24", "https://energetyka24.com/_rss"),
            ("Green News", "https://www.green-news.pl/rss"),
            ("WNP", "https://www.wnp.pl/rss/serwis_rss.xml"),
            ("Biznes Alert", "https://biznesalert.pl/feed/"),
            ("Zielona Gospodarka", "https://zielonagospodarka.pl/articles/rss"),
            ("Teraz Srodowisko", "https://www.teraz-srodowisko.pl/rss/"),
            ("Wysokie Napiecie", "https://wysokienapiecie.pl/feed/"),
            ("CIRE", "https://www.cire.pl/rss/energetyka.xml"),
            ("Kierunek Energetyka", "https://www.kierunekenergetyka.pl/rss.html"),
            ("RP Energetyka", "https://energia.rp.pl/rss/4351-energetyka"),
            (
                "Wyborcza Energetyka",
                "https://wyborcza.biz/pub/rss/wyborcza_biz_energetyka.xml",
            ),
            ("Offshore Wind Poland", "https://offshorewindpoland.pl/feed/"),
            ("Gospodarka Morska", "https://www.gospodarkamorska.pl/articles/rss"),
            ("Business Insider", "https://businessinsider.com.pl/.feed"),
            ("Money", "https://www.money.pl/rss/"),
            (
                "Puls Biznesu",
                "https://www.pb.pl/rss/najnowsze.xml?utm_source=RSS&utm_medium=RSS&utm_campaign=Z%20ostatniej%20chwili",
            ),
            ("Zielona Interia", "https://zielona.interia.pl/feed"),
            ("Gazeta Prawna", "https://biznes.gazetaprawna.pl/.feed"),
            ("Forbes", "https://www.forbes.pl/rss.xml"),
            ("Bankier", "https://www.bankier.pl/rss/wiadomosci.xml"),
            ("Gazeta", "https://www.gazeta.pl/pub/rss/wiadomosci.xml"),
            (
                "Strefa Inwestorow",
                "https://strefainwestorow.pl/w-zielonej-strefie/rss.xml",
            ),
            ("300Gospodarka", "https://300gospodarka.pl/feed"),
            ("Polsat News", "https://www.polsatnews.pl/rss/biznes.xml"),
            ("RP Najnowsze", "https://rp.pl/rss_main?unknown-old-rss"),
            (
                "Wyborcza Najnowsze",
                "https://rss.gazeta.pl/pub/rss/najnowsze_wyborcza.xml",
            ),
            ("TVN24 Biznes", "https://tvn24.pl/biznes.xml"),
            ("Forsal", "https://forsal.pl/.feed"),
            ("Onet", "https://wiadomosci.onet.pl/.feed"),
            ("WP", "https://wiadomosci.wp.pl/rss.xml"),
            ("Newsweek", "https://www.newsweek.pl/.feed"),
            ("TOK FM", "https://www.tokfm.pl/pub/rss/tokfmpl_glowne.xml"),
            ("Wprost", "https://www.wprost.pl/rss/wiadomosci"),
            ("RMF24", "https://www.rmf24.pl/feed"),
            ("300Polityka", "https://300polityka.pl/feed"),
        ]
        .into_iter()
        .map(|(name, url)| Source {
            name: name.to_string(),
            url: url.to_string(),
            time_basis: TimeBasis::Local,
        })
        .collect();

        // WNP reports structured timestamps in UTC; every other feed is
        // treated as naive local time.
        if let Some(wnp) = sources.iter_mut().find(|s| s.name == "WNP") {
            wnp.time_basis = TimeBasis::Utc;
        }

        let keywords = [
            "aramco",
            "lotos",
            "obajtek",
            "orlen",
            "energetyka",
            "wodor",
            "wiatr",
            "pv",
            "offshore",
            "ccs/ccus",
            "pfas",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut keyword_aliases = HashMap::new();
        keyword_aliases.insert(
            "ccs/ccus".to_string(),
            vec!["ccs".to_string(), "ccus".to_string()],
        );

        Self {
            sources,
            keywords,
            keyword_aliases,
        }
    }
}
