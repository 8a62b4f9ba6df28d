//! Two-column parameter sheet
//!
//! Plant planners keep the run parameters in a spreadsheet exported as CSV
//! with a `Parametro` and a `Valor` column, one parameter per row:
//!
//! ```text
//! Parametro,Valor
//! duracion_simulacion,72
//! fecha_inicio,04/03/2024
//! porcentaje_huesos,"42,5"
//! d_extra_check,TRUE
//! ```
//!
//! Values may use a decimal comma, flags are `TRUE`/`FALSE`, and dates are
//! `YYYY-MM-DD` or `DD/MM/YYYY`. Unknown keys are ignored and missing keys
//! keep their [`FacilityConfig`] defaults. An extra-day block is only read
//! when its `*_extra_check` flag is TRUE.

use crate::config::{
    BoxingConfig, ConfigError, DeboningConfig, DeboningExtraDay, FacilityConfig, FreshConfig,
    FreshExtraDay, HourlyExtraDay, HourlyStageConfig, InitialInventory,
};
use crate::models::batch::PalletWeights;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const KEY_COLUMN: &str = "Parametro";
const VALUE_COLUMN: &str = "Valor";
const BOXING_LINES: usize = 7;

/// Raw key/value pairs read from the sheet
#[derive(Debug, Clone, Default)]
struct ParameterSheet {
    values: HashMap<String, String>,
}

impl ParameterSheet {
    fn read<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "header".to_string(),
                    value: headers.join(","),
                })
        };
        let key_idx = column(KEY_COLUMN)?;
        let value_idx = column(VALUE_COLUMN)?;

        let mut values = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let key = record.get(key_idx).map(str::trim).unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            let value = record.get(value_idx).map(str::trim).unwrap_or_default();
            values.insert(key.to_string(), value.to_string());
        }

        Ok(Self { values })
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn number_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.raw(key) {
            None => Ok(default),
            Some(raw) => raw
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    fn number(&self, key: &str) -> Result<f64, ConfigError> {
        self.number_or(key, 0.0)
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.raw(key) {
            None => Ok(false),
            Some(raw) if raw.eq_ignore_ascii_case("TRUE") => Ok(true),
            Some(raw) if raw.eq_ignore_ascii_case("FALSE") => Ok(false),
            Some(raw) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    fn date(&self, key: &str) -> Result<Option<NaiveDate>, ConfigError> {
        match self.raw(key) {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
                .map(Some)
                .map_err(|_| ConfigError::InvalidDate(raw.to_string())),
        }
    }

    fn hourly_stage(&self, prefix: &str) -> Result<HourlyStageConfig, ConfigError> {
        let extra_day = if self.flag(&format!("{prefix}_extra_check"))? {
            Some(HourlyExtraDay {
                start_hour: self.number(&format!("{prefix}_inicio_extra"))?,
                duration_hours: self.number(&format!("{prefix}_duracion_extra"))?,
                kg_per_hour: self.number(&format!("{prefix}_kg_extra"))?,
            })
        } else {
            None
        };
        Ok(HourlyStageConfig {
            start_hour: self.number(&format!("{prefix}_inicio"))?,
            duration_hours: self.number(&format!("{prefix}_duracion"))?,
            kg_per_hour: self.number(&format!("{prefix}_kg"))?,
            extra_day,
        })
    }

    fn deboning(&self) -> Result<DeboningConfig, ConfigError> {
        let extra_day = if self.flag("d_extra_check")? {
            Some(DeboningExtraDay {
                start_hour: self.number("d_inicio_extra")?,
                pigs: self.number("d_cerdos_extra")?,
                offal_kg: self.number("d_peso_despojos_extra")?,
            })
        } else {
            None
        };
        Ok(DeboningConfig {
            start_hour: self.number("d_inicio")?,
            pigs_per_day: self.number("d_cerdos")?,
            line_speed_pigs_per_hour: self.number("d_velo")?,
            oee_percent: self.number("d_oee")?,
            carcass_kg: self.number("d_peso")?,
            offal_kg: self.number("d_peso_despojos")?,
            extra_day,
        })
    }

    fn boxing(&self) -> Result<BoxingConfig, ConfigError> {
        let line_kg_per_hour = (0..BOXING_LINES)
            .map(|line| self.number(&format!("c_linea_{line}")))
            .collect::<Result<Vec<_>, _>>()?;
        let extra_day = if self.flag("c_extra_check")? {
            Some(HourlyExtraDay {
                start_hour: self.number("c_inicio_extra")?,
                duration_hours: self.number("c_duracion_extra")?,
                kg_per_hour: self.number("c_kg_extra")?,
            })
        } else {
            None
        };
        Ok(BoxingConfig {
            start_hour: self.number("c_inicio")?,
            duration_hours: self.number("c_duracion")?,
            line_kg_per_hour,
            extra_day,
        })
    }

    fn fresh(&self) -> Result<FreshConfig, ConfigError> {
        let extra_day = if self.flag("f_extra_check")? {
            Some(FreshExtraDay {
                start_hour: self.number("f_inicio_extra")?,
                duration_hours: self.number("f_duracion_extra")?,
                kg_per_day: self.number("f_kg_dia_extra")?,
            })
        } else {
            None
        };
        Ok(FreshConfig {
            start_hour: self.number("f_inicio")?,
            duration_hours: self.number("f_duracion")?,
            kg_per_day: self.number("f_kg_dia")?,
            extra_day,
        })
    }

    fn into_config(self) -> Result<FacilityConfig, ConfigError> {
        let defaults = FacilityConfig::default();
        let weights = PalletWeights::default();

        Ok(FacilityConfig {
            horizon_hours: self.number("duracion_simulacion")?.max(0.0).round() as usize,
            start_date: self.date("fecha_inicio")?.unwrap_or(defaults.start_date),
            initial_inventory: InitialInventory {
                chamber_kg: self.number("kg_iniciales_camara")?,
                frozen_tunnel_kg: self.number("kg_iniciales_tunel_congelado")?,
                freezing_tunnel_kg: self.number("kg_iniciales_tunel_frescos")?,
                freezing_hours_remaining: self
                    .number("horas_restantes_congelacion")?
                    .max(0.0)
                    .round() as u32,
            },
            bones_percent: self.number_or("porcentaje_huesos", defaults.bones_percent)?,
            pallet_weights: PalletWeights::new(
                self.number_or("kg_pallet_huesos", weights.bones_kg)?,
                self.number_or("kg_pallet_carne", weights.meat_kg)?,
            ),
            tunnels: defaults.tunnels,
            deboning: self.deboning()?,
            boxing: self.boxing()?,
            plates: self.hourly_stage("p")?,
            fresh: self.fresh()?,
            release: self.hourly_stage("v")?,
            pacing_seconds_per_hour: self.number("segundos_por_hora_sim")?,
        })
    }
}

/// Build a configuration from a parameter sheet
///
/// # Example
///
/// ```rust
/// use cold_storage_simulator_core_rs::config::sheet::from_parameter_sheet;
///
/// let csv = "Parametro,Valor\nduracion_simulacion,48\nc_linea_0,\"450,5\"\nv_extra_check,FALSE\n";
/// let config = from_parameter_sheet(csv.as_bytes()).unwrap();
///
/// assert_eq!(config.horizon_hours, 48);
/// assert_eq!(config.boxing.total_kg_per_hour(), 450.5);
/// assert!(config.release.extra_day.is_none());
/// ```
pub fn from_parameter_sheet<R: Read>(reader: R) -> Result<FacilityConfig, ConfigError> {
    ParameterSheet::read(reader)?.into_config()
}

/// Read a parameter sheet from disk
pub fn from_parameter_sheet_path<P: AsRef<Path>>(path: P) -> Result<FacilityConfig, ConfigError> {
    let file = File::open(path.as_ref()).map_err(csv::Error::from)?;
    from_parameter_sheet(file)
}
