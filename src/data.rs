use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fs::{self, File},
    io,
    path::Path,
};
use tracing::info;

use crate::error::{AtlasError, Result};

/// The fixed indicator set carried by every record. Variant order matches
/// the value storage in [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TotalPopulation,
    GrowthRate,
    PopulationDensity,
    TotalFertilityRate,
    LifeExpectancy,
    PropertyRights,
    GovernmentIntegrity,
    JudicialEffectiveness,
    TaxBurden,
    GovernmentSpending,
    FiscalHealth,
    BusinessFreedom,
    LaborFreedom,
    InvestmentFreedom,
    FinancialFreedom,
    RecyclingScore,
    WasteManagementScore,
    SdgScore,
}

impl Metric {
    pub const ALL: [Metric; 18] = [
        Metric::TotalPopulation,
        Metric::GrowthRate,
        Metric::PopulationDensity,
        Metric::TotalFertilityRate,
        Metric::LifeExpectancy,
        Metric::PropertyRights,
        Metric::GovernmentIntegrity,
        Metric::JudicialEffectiveness,
        Metric::TaxBurden,
        Metric::GovernmentSpending,
        Metric::FiscalHealth,
        Metric::BusinessFreedom,
        Metric::LaborFreedom,
        Metric::InvestmentFreedom,
        Metric::FinancialFreedom,
        Metric::RecyclingScore,
        Metric::WasteManagementScore,
        Metric::SdgScore,
    ];

    /// Demographic indicators offered on the map and as chart axes.
    pub const MAP_METRICS: [Metric; 5] = [
        Metric::TotalPopulation,
        Metric::GrowthRate,
        Metric::PopulationDensity,
        Metric::TotalFertilityRate,
        Metric::LifeExpectancy,
    ];

    /// Economic-freedom indicators offered in the ranking view.
    pub const GOVERNANCE_METRICS: [Metric; 10] = [
        Metric::PropertyRights,
        Metric::GovernmentIntegrity,
        Metric::JudicialEffectiveness,
        Metric::TaxBurden,
        Metric::GovernmentSpending,
        Metric::FiscalHealth,
        Metric::BusinessFreedom,
        Metric::LaborFreedom,
        Metric::InvestmentFreedom,
        Metric::FinancialFreedom,
    ];

    /// Climate/sustainability indicators offered in the ranking view.
    pub const CLIMATE_METRICS: [Metric; 3] = [
        Metric::RecyclingScore,
        Metric::WasteManagementScore,
        Metric::SdgScore,
    ];

    /// Display label, identical to the CSV column header.
    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalPopulation => "Total Population",
            Metric::GrowthRate => "Growth Rate",
            Metric::PopulationDensity => "Population Density (per sq km)",
            Metric::TotalFertilityRate => "Total Fertility Rate",
            Metric::LifeExpectancy => "Life Expectancy at Birth",
            Metric::PropertyRights => "Property Rights",
            Metric::GovernmentIntegrity => "Government Integrity",
            Metric::JudicialEffectiveness => "Judicial Effectiveness",
            Metric::TaxBurden => "Tax Burden",
            Metric::GovernmentSpending => "Government Spending",
            Metric::FiscalHealth => "Fiscal Health",
            Metric::BusinessFreedom => "Business Freedom",
            Metric::LaborFreedom => "Labor Freedom",
            Metric::InvestmentFreedom => "Investment Freedom",
            Metric::FinancialFreedom => "Financial Freedom",
            Metric::RecyclingScore => "Recycling Score",
            Metric::WasteManagementScore => "Waste Management Score",
            Metric::SdgScore => "Overall Sustainable Development Goal Score",
        }
    }
}

/// One CSV row as it appears on disk. Every column beyond the key ones is
/// optional; ragged rows are the norm in this dataset.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default, rename = "Name")]
    name: Option<String>,
    #[serde(default)]
    year: Option<f64>,
    #[serde(default, rename = "Total Population")]
    total_population: Option<f64>,
    #[serde(default, rename = "Growth Rate")]
    growth_rate: Option<f64>,
    #[serde(default, rename = "Population Density (per sq km)")]
    population_density: Option<f64>,
    #[serde(default, rename = "Total Fertility Rate")]
    total_fertility_rate: Option<f64>,
    #[serde(default, rename = "Life Expectancy at Birth")]
    life_expectancy: Option<f64>,
    #[serde(default, rename = "Property Rights")]
    property_rights: Option<f64>,
    #[serde(default, rename = "Government Integrity")]
    government_integrity: Option<f64>,
    #[serde(default, rename = "Judicial Effectiveness")]
    judicial_effectiveness: Option<f64>,
    #[serde(default, rename = "Tax Burden")]
    tax_burden: Option<f64>,
    #[serde(default, rename = "Government Spending")]
    government_spending: Option<f64>,
    #[serde(default, rename = "Fiscal Health")]
    fiscal_health: Option<f64>,
    #[serde(default, rename = "Business Freedom")]
    business_freedom: Option<f64>,
    #[serde(default, rename = "Labor Freedom")]
    labor_freedom: Option<f64>,
    #[serde(default, rename = "Investment Freedom")]
    investment_freedom: Option<f64>,
    #[serde(default, rename = "Financial Freedom")]
    financial_freedom: Option<f64>,
    #[serde(default, rename = "Recycling Score")]
    recycling_score: Option<f64>,
    #[serde(default, rename = "Waste Management Score")]
    waste_management_score: Option<f64>,
    #[serde(default, rename = "Overall Sustainable Development Goal Score")]
    sdg_score: Option<f64>,
}

impl RawRow {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalPopulation => self.total_population,
            Metric::GrowthRate => self.growth_rate,
            Metric::PopulationDensity => self.population_density,
            Metric::TotalFertilityRate => self.total_fertility_rate,
            Metric::LifeExpectancy => self.life_expectancy,
            Metric::PropertyRights => self.property_rights,
            Metric::GovernmentIntegrity => self.government_integrity,
            Metric::JudicialEffectiveness => self.judicial_effectiveness,
            Metric::TaxBurden => self.tax_burden,
            Metric::GovernmentSpending => self.government_spending,
            Metric::FiscalHealth => self.fiscal_health,
            Metric::BusinessFreedom => self.business_freedom,
            Metric::LaborFreedom => self.labor_freedom,
            Metric::InvestmentFreedom => self.investment_freedom,
            Metric::FinancialFreedom => self.financial_freedom,
            Metric::RecyclingScore => self.recycling_score,
            Metric::WasteManagementScore => self.waste_management_score,
            Metric::SdgScore => self.sdg_score,
        }
    }
}

/// One (country, year) observation.
#[derive(Debug, Clone)]
pub struct Record {
    pub country_code: String,
    pub name: String,
    pub year: i32,
    values: [Option<f64>; Metric::ALL.len()],
}

impl Record {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.values[metric as usize]
    }
}

/// The loaded dataset. Immutable after `load`; (country_code, year) is
/// unique and codes are restricted to the first `country_cap` distinct
/// codes in file order.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<Record>,
    years: Vec<i32>,
    codes: Vec<String>,
    names: HashMap<String, String>,
}

impl Dataset {
    pub fn load(path: &Path, country_cap: usize) -> Result<Self> {
        let file = File::open(path)?;
        let dataset = Self::from_reader(file, country_cap)?;
        info!(
            countries = dataset.codes.len(),
            rows = dataset.records.len(),
            years = dataset.years.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: io::Read>(reader: R, country_cap: usize) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        let mut codes: Vec<String> = Vec::new();
        let mut names = HashMap::new();
        let mut seen: HashSet<(String, i32)> = HashSet::new();
        let mut years = BTreeSet::new();

        for row in csv_reader.deserialize::<RawRow>() {
            let row = row?;
            let (Some(code), Some(year)) = (row.country_code.clone(), row.year) else {
                continue;
            };
            if code.is_empty() || !year.is_finite() {
                continue;
            }
            let year = year as i32;
            if !codes.contains(&code) {
                if codes.len() >= country_cap {
                    continue;
                }
                codes.push(code.clone());
            }
            if !seen.insert((code.clone(), year)) {
                continue;
            }
            let name = match row.name.as_deref() {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => code.clone(),
            };
            names.entry(code.clone()).or_insert_with(|| name.clone());
            years.insert(year);
            records.push(Record {
                country_code: code,
                name,
                year,
                values: Metric::ALL.map(|m| row.metric(m).filter(|v| v.is_finite())),
            });
        }

        if records.is_empty() {
            return Err(AtlasError::EmptyDataset);
        }
        Ok(Self {
            records,
            years: years.into_iter().collect(),
            codes,
            names,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Allow-listed country codes in first-encountered order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// Merges display-name overrides from an external lookup; codes absent
    /// from the dataset are ignored so `name_for` keeps echoing them back.
    pub fn extend_names(&mut self, overrides: impl IntoIterator<Item = (String, String)>) {
        for (code, name) in overrides {
            if self.is_known(&code) {
                self.names.insert(code, name);
            }
        }
    }

    /// Display name for a code; echoes the code back when unrecognized.
    pub fn name_for<'a>(&'a self, code: &'a str) -> &'a str {
        self.names.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Optional code→name sidecar file; a missing or malformed file just
    /// means no overrides.
    pub fn load_name_overrides(path: &Path) -> Option<BTreeMap<String, String>> {
        let bytes = fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// All records for one country, ascending by year.
    pub fn history(&self, code: &str) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| r.country_code == code)
            .collect();
        rows.sort_by_key(|r| r.year);
        rows
    }
}
