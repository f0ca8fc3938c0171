//! Engineering rules for overhead distribution networks.
//!
//! Span limits, pole dimensioning, structure tables and the whole-project
//! validator. Everything here is a pure function of its arguments.

use crate::error::PlanError;
use crate::models::{
    AreaType, ConductorRecord, CorrosionZone, NetworkNature, NetworkType, PoleFunction,
    PoleRecord, ProjectConfig, Severity, ValidationFinding, VoltageLevel,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Maximum span limits in meters.
pub mod max_spans {
    /// Any span over a crossing, or at a deflection above 60 degrees.
    pub const CROSSING: f64 = 40.0;
    pub const MONOPHASE_RURAL: f64 = 150.0;
    pub const CONJUGATED_URBAN: f64 = 45.0;
    pub const CONJUGATED_RURAL: f64 = 80.0;
    pub const COMPACT_URBAN: f64 = 60.0;
    pub const COMPACT_RURAL: f64 = 80.0;
    pub const CONVENTIONAL_URBAN: f64 = 80.0;
    pub const CONVENTIONAL_RURAL: f64 = 120.0;
}

pub const MIN_SPAN_URBAN_M: f64 = 30.0;
pub const MIN_SPAN_RURAL_M: f64 = 40.0;

/// Deflection above which a span is limited like a crossing.
pub const SHARP_DEFLECTION_DEG: f64 = 60.0;

/// Minimum pole heights in meters.
pub mod pole_heights {
    pub const WITH_TRANSFORMER: f64 = 12.0;
    pub const WITH_RECLOSER: f64 = 12.0;
    pub const COMPACT: f64 = 11.0;
    pub const CONJUGATED: f64 = 11.0;
    pub const RURAL: f64 = 11.0;
    pub const CONVENTIONAL: f64 = 11.0;
}

/// Minimum nominal resistances in daN.
pub mod resistances {
    pub const DEFAULT: u32 = 300;
    pub const END_MONOPHASE: u32 = 300;
    pub const END_TRIPHASE: u32 = 600;
    pub const ANCHOR: u32 = 600;
    pub const HEAVY_CONDUCTOR: u32 = 600;
    pub const TRANSFORMER_SMALL: u32 = 600;
    pub const TRANSFORMER_150_KVA: u32 = 1000;
    pub const TRANSFORMER_225_KVA: u32 = 1500;
    pub const RECLOSER: u32 = 600;
}

/// Resistance at and above which the pole base is concreted.
pub const CONCRETED_EMBEDDING_DAN: u32 = 600;

/// Medium-voltage poles shorter than this fail validation.
pub const MIN_MV_POLE_HEIGHT_M: f64 = 11.0;

/// Grounding interval along the medium-voltage line.
pub const GROUNDING_MAX_INTERVAL_M: f64 = 200.0;
pub const GROUNDING_RECOMMENDED_INTERVAL_M: f64 = 150.0;

/// Deflections above this make a pole an anchor.
pub const ANCHOR_DEFLECTION_DEG: f64 = 60.0;
/// Deflections above this make a pole an angle pole.
pub const ANGLE_DEFLECTION_DEG: f64 = 30.0;

/// Conductors that call for a reinforced pole, compared without spaces.
const HEAVY_CONDUCTORS: &[&str] = &["4/0AWG", "336.4MCM", "185MM²", "185MM2"];

/// MV gauges accepted in corrosive zones, compared without spaces.
const CORROSION_SAFE_GAUGES: &[&str] = &["1/0AWG", "4/0AWG", "336.4MCM"];
const CORROSION_MIN_GAUGE: &str = "1/0 AWG";

/// Maximum span for a configuration, optionally at a crossing or a sharp turn.
pub fn max_span(config: &ProjectConfig, is_crossing: bool, deflection_deg: f64) -> f64 {
    if is_crossing || deflection_deg > SHARP_DEFLECTION_DEG {
        return max_spans::CROSSING;
    }

    let rural = config.area_type == AreaType::Rural;
    if config.nature == NetworkNature::Monophase
        && rural
        && config.network_type == NetworkType::Conventional
    {
        return max_spans::MONOPHASE_RURAL;
    }

    if config.with_low_voltage {
        return if rural {
            max_spans::CONJUGATED_RURAL
        } else {
            max_spans::CONJUGATED_URBAN
        };
    }

    match (config.network_type, rural) {
        (NetworkType::Compact, true) => max_spans::COMPACT_RURAL,
        (NetworkType::Compact, false) => max_spans::COMPACT_URBAN,
        (NetworkType::Conventional, true) => max_spans::CONVENTIONAL_RURAL,
        (NetworkType::Conventional, false) => max_spans::CONVENTIONAL_URBAN,
    }
}

pub fn min_span(config: &ProjectConfig) -> f64 {
    match config.area_type {
        AreaType::Urban => MIN_SPAN_URBAN_M,
        AreaType::Rural => MIN_SPAN_RURAL_M,
    }
}

fn base_ideal_span(config: &ProjectConfig) -> f64 {
    match (config.area_type, config.network_type) {
        (AreaType::Urban, NetworkType::Conventional) => 50.0,
        (AreaType::Urban, NetworkType::Compact) => 35.0,
        (AreaType::Rural, NetworkType::Conventional) => 100.0,
        (AreaType::Rural, NetworkType::Compact) => 60.0,
    }
}

/// Preferred span between poles.
///
/// Obstacles cut the base value by 20 %. Slopes above 15 % cut it further,
/// never below 70 %. The result is floored at [`min_span`] and capped at
/// [`max_span`].
pub fn ideal_span(config: &ProjectConfig, has_obstacles: bool, max_slope_pct: f64) -> f64 {
    let floor = min_span(config);
    let mut ideal = base_ideal_span(config);

    if has_obstacles {
        ideal = floor.max(ideal * 0.8);
    }
    if max_slope_pct > 15.0 {
        let factor = (1.0 - (max_slope_pct - 15.0) / 50.0).max(0.7);
        ideal = floor.max(ideal * factor);
    }

    ideal.round().min(max_span(config, false, 0.0))
}

/// Ideal/min/max span bundle handed to the placement step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanTargets {
    pub ideal_m: f64,
    pub min_m: f64,
    pub max_m: f64,
}

impl SpanTargets {
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            ideal_m: ideal_span(config, false, 0.0),
            min_m: min_span(config),
            max_m: max_span(config, false, 0.0),
        }
    }

    pub fn with_ideal(mut self, ideal_m: f64) -> Self {
        self.ideal_m = ideal_m;
        self
    }

    /// Reject non-positive or non-finite values, then clamp the ideal span
    /// into `[min_m, max_m]`. The maximum wins if the two bounds cross.
    pub fn validate(self) -> Result<Self, PlanError> {
        for (name, value) in [("ideal", self.ideal_m), ("min", self.min_m), ("max", self.max_m)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanError::InvalidSpan { name, value });
            }
        }
        Ok(Self {
            ideal_m: self.ideal_m.max(self.min_m).min(self.max_m),
            ..self
        })
    }
}

/// Equipment and conductor details that affect pole sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoleOptions {
    #[serde(default)]
    pub transformer_kva: Option<f64>,
    #[serde(default)]
    pub heavy_conductor: bool,
    #[serde(default)]
    pub recloser: bool,
    #[serde(default)]
    pub regulator: bool,
}

impl PoleOptions {
    fn transformer(&self) -> Option<f64> {
        self.transformer_kva.filter(|kva| *kva > 0.0)
    }

    fn special_device(&self) -> bool {
        self.recloser || self.regulator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Embedding {
    Simple,
    Concreted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteClass {
    II,
    IV,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleDimensioning {
    pub height_m: f64,
    pub resistance_dan: u32,
    /// Pole type; always double-T concrete.
    pub kind: String,
    pub class: ConcreteClass,
    pub embedding: Embedding,
    /// Canonical drawing label, e.g. `DT 11/300`.
    pub annotation: String,
}

/// Size a pole for its function and the equipment it carries.
pub fn dimension_pole(
    config: &ProjectConfig,
    function: PoleFunction,
    options: &PoleOptions,
) -> PoleDimensioning {
    let transformer = options.transformer();

    let height_m = if transformer.is_some() {
        pole_heights::WITH_TRANSFORMER
    } else if options.special_device() {
        pole_heights::WITH_RECLOSER
    } else if config.network_type == NetworkType::Compact {
        pole_heights::COMPACT
    } else if config.with_low_voltage {
        pole_heights::CONJUGATED
    } else if config.area_type == AreaType::Rural {
        pole_heights::RURAL
    } else {
        pole_heights::CONVENTIONAL
    };

    let resistance_dan = if let Some(kva) = transformer {
        if kva >= 225.0 {
            resistances::TRANSFORMER_225_KVA
        } else if kva >= 150.0 {
            resistances::TRANSFORMER_150_KVA
        } else {
            resistances::TRANSFORMER_SMALL
        }
    } else if options.special_device() {
        resistances::RECLOSER
    } else if options.heavy_conductor {
        resistances::HEAVY_CONDUCTOR
    } else if function == PoleFunction::Anchor {
        resistances::ANCHOR
    } else if matches!(function, PoleFunction::EndOfLine | PoleFunction::Derivation) {
        if config.nature == NetworkNature::Triphase {
            resistances::END_TRIPHASE
        } else {
            resistances::END_MONOPHASE
        }
    } else {
        resistances::DEFAULT
    };

    let embedding = if resistance_dan >= CONCRETED_EMBEDDING_DAN {
        Embedding::Concreted
    } else {
        Embedding::Simple
    };

    let class = match config.corrosion_zone {
        CorrosionZone::P2 => ConcreteClass::IV,
        CorrosionZone::P1 if resistance_dan >= CONCRETED_EMBEDDING_DAN => ConcreteClass::IV,
        CorrosionZone::P1 | CorrosionZone::Normal => ConcreteClass::II,
    };

    PoleDimensioning {
        height_m,
        resistance_dan,
        kind: "DT".to_string(),
        class,
        embedding,
        annotation: format!("DT {height_m}/{resistance_dan}"),
    }
}

/// One medium-voltage structure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureFamily {
    pub name: &'static str,
    pub tangent: &'static str,
    pub angle: &'static str,
    pub derivation: &'static str,
    pub end: &'static str,
    pub anchor: Option<&'static str>,
    pub angle_sectioning: Option<&'static str>,
}

/// Rural monophase.
pub const FAMILY_U: StructureFamily = StructureFamily {
    name: "U",
    tangent: "U1",
    angle: "U2",
    derivation: "U3",
    end: "U3",
    anchor: None,
    angle_sectioning: Some("U4"),
};

/// Triphase normal.
pub const FAMILY_N: StructureFamily = StructureFamily {
    name: "N",
    tangent: "N1",
    angle: "N2",
    derivation: "N3",
    end: "N3",
    anchor: None,
    angle_sectioning: Some("N4"),
};

/// Compact urban. No dedicated small-angle structure.
pub const FAMILY_CE: StructureFamily = StructureFamily {
    name: "CE",
    tangent: "CE1",
    angle: "CE1",
    derivation: "CE3",
    end: "CE3",
    anchor: Some("CE3"),
    angle_sectioning: None,
};

pub fn structure_family(config: &ProjectConfig) -> &'static StructureFamily {
    if config.network_type == NetworkType::Compact {
        &FAMILY_CE
    } else if config.nature == NetworkNature::Monophase {
        &FAMILY_U
    } else {
        &FAMILY_N
    }
}

/// Medium-voltage structure code for a pole.
///
/// A tangent pole turning more than 30 degrees is treated as an angle pole.
/// Functions without an entry in the family fall back to its end or tangent
/// structure.
pub fn select_structure(
    config: &ProjectConfig,
    function: PoleFunction,
    deflection_deg: f64,
    has_sectioning: bool,
) -> &'static str {
    let family = structure_family(config);
    let function = if function == PoleFunction::Tangent && deflection_deg > ANGLE_DEFLECTION_DEG {
        PoleFunction::Angle
    } else {
        function
    };

    match function {
        PoleFunction::Tangent => family.tangent,
        PoleFunction::Angle => match family.angle_sectioning {
            Some(code) if has_sectioning => code,
            _ => family.angle,
        },
        PoleFunction::Derivation | PoleFunction::Equipment => family.derivation,
        PoleFunction::EndOfLine => family.end,
        PoleFunction::Anchor => family.anchor.unwrap_or(family.end),
    }
}

/// Low-voltage multiplexed (SI) structure code.
pub fn select_lv_structure(function: PoleFunction) -> &'static str {
    match function {
        PoleFunction::Derivation => "SI3",
        PoleFunction::EndOfLine => "SI4",
        _ => "SI1",
    }
}

/// Conductors and their drawing labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorSpec {
    pub mv_cable: String,
    pub lv_cable: String,
    /// e.g. `ABC 3 #1/0 AWG CAA`.
    pub mv_annotation: String,
    /// e.g. `ABCN 4 #35(35) MULT`; empty without a low-voltage line.
    pub lv_annotation: String,
}

fn compact_gauge(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>()
        .to_uppercase()
}

pub fn select_conductor(config: &ProjectConfig) -> ConductorSpec {
    let mut mv = if config.mv_conductor.trim().is_empty() {
        "1/0 AWG".to_string()
    } else {
        config.mv_conductor.clone()
    };
    let lv = if config.lv_conductor.trim().is_empty() {
        "35(35)".to_string()
    } else {
        config.lv_conductor.clone()
    };

    if config.corrosion_zone != CorrosionZone::Normal {
        let gauge = compact_gauge(&mv);
        if !CORROSION_SAFE_GAUGES.iter().any(|safe| gauge.contains(safe)) {
            mv = CORROSION_MIN_GAUGE.to_string();
        }
    }

    let (mv_phases, mv_count) = match config.nature {
        NetworkNature::Monophase => ("AC", 2),
        NetworkNature::Biphase => ("AB", 2),
        NetworkNature::Triphase => ("ABC", 3),
    };
    let mv_insulation = match config.network_type {
        NetworkType::Compact => "XLPE",
        NetworkType::Conventional => "CAA",
    };
    let (lv_phases, lv_count) = match config.nature {
        NetworkNature::Monophase => ("AN", 1),
        NetworkNature::Biphase | NetworkNature::Triphase => ("ABCN", 4),
    };

    ConductorSpec {
        mv_annotation: format!("{mv_phases} {mv_count} #{mv} {mv_insulation}"),
        lv_annotation: if config.with_low_voltage {
            format!("{lv_phases} {lv_count} #{lv} MULT")
        } else {
            String::new()
        },
        mv_cable: mv,
        lv_cable: lv,
    }
}

/// True when the conductor requires a reinforced pole.
pub fn is_heavy_conductor(name: &str) -> bool {
    let gauge = compact_gauge(name);
    HEAVY_CONDUCTORS.iter().any(|heavy| gauge.contains(heavy))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingLocation {
    Street,
    Avenue,
    StateHighway,
    FederalHighway,
    Railway,
    ElectrifiedRailway,
}

/// Minimum conductor height over a crossing. `None` means the network may not cross at all.
pub fn crossing_clearance_height(location: CrossingLocation, level: VoltageLevel) -> Option<f64> {
    let (lv, mv) = match location {
        CrossingLocation::Street | CrossingLocation::Avenue => (Some(5.5), 6.0),
        CrossingLocation::StateHighway | CrossingLocation::FederalHighway => (Some(7.0), 7.0),
        CrossingLocation::Railway => (Some(6.0), 9.0),
        CrossingLocation::ElectrifiedRailway => (None, 12.0),
    };
    match level {
        VoltageLevel::Low => lv,
        VoltageLevel::Medium => Some(mv),
    }
}

pub fn grounding_recommended(distance_since_last_m: f64) -> bool {
    distance_since_last_m >= GROUNDING_RECOMMENDED_INTERVAL_M
}

pub fn grounding_required(distance_since_last_m: f64) -> bool {
    distance_since_last_m >= GROUNDING_MAX_INTERVAL_M
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrosionComponent {
    Conductor,
    Pole,
    Hardware,
    Insulator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub material: String,
    pub specification: String,
}

impl MaterialSpec {
    fn new(material: &str, specification: impl Into<String>) -> Self {
        Self {
            material: material.to_string(),
            specification: specification.into(),
        }
    }
}

/// Material required for a component in the project's corrosion zone.
pub fn select_corrosion_material(
    config: &ProjectConfig,
    component: CorrosionComponent,
) -> MaterialSpec {
    let zone = config.corrosion_zone;
    match component {
        CorrosionComponent::Conductor => match zone {
            CorrosionZone::Normal => MaterialSpec::new("CAA", "standard"),
            CorrosionZone::P1 | CorrosionZone::P2 => {
                MaterialSpec::new("CA", format!("minimum {CORROSION_MIN_GAUGE}"))
            }
        },
        CorrosionComponent::Pole => match zone {
            CorrosionZone::Normal => MaterialSpec::new("concrete", "class II"),
            CorrosionZone::P1 => MaterialSpec::new("concrete", "class II"),
            CorrosionZone::P2 => MaterialSpec::new("concrete", "class IV"),
        },
        CorrosionComponent::Hardware => match zone {
            CorrosionZone::Normal => MaterialSpec::new("galvanized", "normal"),
            CorrosionZone::P1 => MaterialSpec::new("hot-dip galvanized", "zone P1"),
            CorrosionZone::P2 => {
                MaterialSpec::new("stainless or hot-dip galvanized steel", "zone P2")
            }
        },
        CorrosionComponent::Insulator => match zone {
            CorrosionZone::P2 => {
                MaterialSpec::new("polymeric or glazed porcelain", "bushing min 25 kV")
            }
            CorrosionZone::Normal | CorrosionZone::P1 => {
                MaterialSpec::new("porcelain or polymeric", "standard")
            }
        },
    }
}

/// Pole function from its turning angle and role on the line.
pub fn pole_function(
    deflection_deg: f64,
    end_of_line: bool,
    derivation: bool,
    equipment: bool,
) -> PoleFunction {
    if equipment {
        PoleFunction::Equipment
    } else if end_of_line {
        PoleFunction::EndOfLine
    } else if derivation {
        PoleFunction::Derivation
    } else if deflection_deg > ANCHOR_DEFLECTION_DEG {
        PoleFunction::Anchor
    } else if deflection_deg > ANGLE_DEFLECTION_DEG {
        PoleFunction::Angle
    } else {
        PoleFunction::Tangent
    }
}

/// Result of [`validate_project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectValidation {
    /// No error-severity findings.
    pub valid: bool,
    pub findings: Vec<ValidationFinding>,
}

impl ProjectValidation {
    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.with_severity(Severity::Info)
    }
}

/// Check a finished pole/conductor list. Never fails; see [`ProjectValidation::valid`].
pub fn validate_project(
    poles: &[PoleRecord],
    conductors: &[ConductorRecord],
    config: &ProjectConfig,
) -> ProjectValidation {
    let max = max_span(config, false, 0.0);
    let min = min_span(config);
    let mut findings = Vec::new();

    for conductor in conductors {
        let field = format!("conductor.{}.length", conductor.id);
        if conductor.length_m > max {
            findings.push(ValidationFinding::new(
                field.clone(),
                conductor.length_m,
                format!("<= {max}"),
                Severity::Error,
                format!(
                    "span of {:.1} m exceeds the maximum of {max} m",
                    conductor.length_m
                ),
            ));
        }
        if conductor.length_m < min {
            findings.push(ValidationFinding::new(
                field,
                conductor.length_m,
                format!(">= {min}"),
                Severity::Warning,
                format!(
                    "span of {:.1} m is below the minimum of {min} m",
                    conductor.length_m
                ),
            ));
        }
    }

    for pole in poles {
        if pole.height_m < MIN_MV_POLE_HEIGHT_M {
            findings.push(ValidationFinding::new(
                format!("pole.{}.height", pole.id),
                pole.height_m,
                format!(">= {MIN_MV_POLE_HEIGHT_M}"),
                Severity::Error,
                format!(
                    "pole {} is {} m tall, below the minimum of {MIN_MV_POLE_HEIGHT_M} m",
                    pole.id, pole.height_m
                ),
            ));
        }
        if pole.resistance_dan < resistances::DEFAULT {
            findings.push(ValidationFinding::new(
                format!("pole.{}.resistance", pole.id),
                pole.resistance_dan,
                format!(">= {}", resistances::DEFAULT),
                Severity::Error,
                format!(
                    "pole {} is rated {} daN, below the minimum of {} daN",
                    pole.id,
                    pole.resistance_dan,
                    resistances::DEFAULT
                ),
            ));
        }
    }

    let grounded: HashMap<&str, bool> = poles
        .iter()
        .map(|pole| (pole.id.as_str(), pole.grounded))
        .collect();
    let mut ungrounded_run = 0.0;
    for conductor in conductors
        .iter()
        .filter(|c| c.network == VoltageLevel::Medium)
    {
        ungrounded_run += conductor.length_m;
        if grounded
            .get(conductor.to_pole_id.as_str())
            .copied()
            .unwrap_or(false)
        {
            ungrounded_run = 0.0;
            continue;
        }
        if ungrounded_run > GROUNDING_MAX_INTERVAL_M {
            findings.push(ValidationFinding::new(
                "grounding",
                ungrounded_run,
                format!("<= {GROUNDING_MAX_INTERVAL_M}"),
                Severity::Warning,
                format!(
                    "{ungrounded_run:.0} m of line without grounding exceeds the maximum interval"
                ),
            ));
            ungrounded_run = 0.0;
        }
    }

    let summary = format!(
        "{:?} {:?} {:?}",
        config.network_type, config.nature, config.area_type
    )
    .to_lowercase();
    findings.push(ValidationFinding::new(
        "configuration",
        summary.clone(),
        "-",
        Severity::Info,
        format!("project: {summary}"),
    ));
    findings.push(ValidationFinding::new(
        "totals",
        json!({ "poles": poles.len(), "conductors": conductors.len() }),
        "-",
        Severity::Info,
        format!("{} poles, {} spans", poles.len(), conductors.len()),
    ));
    findings.push(ValidationFinding::new(
        "spans",
        json!({ "min": min, "max": max }),
        "-",
        Severity::Info,
        format!("permitted spans: {min} m to {max} m"),
    ));

    let valid = !findings.iter().any(|f| f.severity == Severity::Error);
    ProjectValidation { valid, findings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn urban_conventional() -> ProjectConfig {
        ProjectConfig {
            area_type: AreaType::Urban,
            ..ProjectConfig::default()
        }
    }

    fn pole(id: &str, height_m: f64, resistance_dan: u32, grounded: bool) -> PoleRecord {
        PoleRecord {
            id: id.to_string(),
            coordinate: Coordinate::new(0.0, 0.0),
            function: PoleFunction::Tangent,
            height_m,
            resistance_dan,
            structure: "N1".into(),
            lv_structure: None,
            annotation: format!("DT {height_m}/{resistance_dan}"),
            grounded,
            transformer_kva: None,
            guyed: false,
            justification: String::new(),
        }
    }

    fn span(id: &str, from: &str, to: &str, length_m: f64, network: VoltageLevel) -> ConductorRecord {
        ConductorRecord {
            id: id.to_string(),
            network,
            cable: "1/0 AWG".into(),
            length_m,
            from_pole_id: from.to_string(),
            to_pole_id: to.to_string(),
        }
    }

    #[test]
    fn max_span_table() {
        let mut config = urban_conventional();
        assert_eq!(max_span(&config, false, 0.0), 80.0);
        assert_eq!(max_span(&config, true, 0.0), 40.0);
        assert_eq!(max_span(&config, false, 61.0), 40.0);
        assert_eq!(max_span(&config, false, 60.0), 80.0);

        config.network_type = NetworkType::Compact;
        assert_eq!(max_span(&config, false, 0.0), 60.0);
        config.area_type = AreaType::Rural;
        assert_eq!(max_span(&config, false, 0.0), 80.0);

        config.network_type = NetworkType::Conventional;
        assert_eq!(max_span(&config, false, 0.0), 120.0);
        config.nature = NetworkNature::Monophase;
        assert_eq!(max_span(&config, false, 0.0), 150.0);

        config.nature = NetworkNature::Triphase;
        config.with_low_voltage = true;
        assert_eq!(max_span(&config, false, 0.0), 80.0);
        config.area_type = AreaType::Urban;
        assert_eq!(max_span(&config, false, 0.0), 45.0);
    }

    #[test]
    fn min_span_depends_on_area_only() {
        assert_eq!(min_span(&urban_conventional()), 30.0);
        assert_eq!(min_span(&ProjectConfig::default()), 40.0);
    }

    #[test]
    fn ideal_span_reductions() {
        let urban = urban_conventional();
        assert_eq!(ideal_span(&urban, false, 0.0), 50.0);
        assert_eq!(ideal_span(&urban, true, 0.0), 40.0);
        // 40 * max(0.7, 1 - 15/50) = 28, floored at 30.
        assert_eq!(ideal_span(&urban, true, 30.0), 30.0);

        let rural = ProjectConfig::default();
        assert_eq!(ideal_span(&rural, false, 0.0), 100.0);
        assert_eq!(ideal_span(&rural, false, 25.0), 80.0);
    }

    #[test]
    fn span_targets_clamp_ideal_and_reject_garbage() {
        let targets = SpanTargets::from_config(&urban_conventional());
        assert_eq!(targets, SpanTargets { ideal_m: 50.0, min_m: 30.0, max_m: 80.0 });

        let clamped = targets.with_ideal(120.0).validate().expect("positive spans");
        assert_eq!(clamped.ideal_m, 80.0);

        // A tiny ideal would otherwise plant a pole every millimeter.
        let raised = targets.with_ideal(1e-3).validate().expect("positive spans");
        assert_eq!(raised.ideal_m, 30.0);
        let crossed = SpanTargets { ideal_m: 10.0, min_m: 90.0, max_m: 80.0 };
        assert_eq!(crossed.validate().expect("positive spans").ideal_m, 80.0);

        assert!(matches!(
            targets.with_ideal(f64::NAN).validate(),
            Err(PlanError::InvalidSpan { name: "ideal", .. })
        ));
        assert!(targets.with_ideal(-1.0).validate().is_err());
    }

    #[test]
    fn dimension_pole_priority_chains() {
        let config = urban_conventional();
        let plain = dimension_pole(&config, PoleFunction::Tangent, &PoleOptions::default());
        assert_eq!(plain.height_m, 11.0);
        assert_eq!(plain.resistance_dan, 300);
        assert_eq!(plain.embedding, Embedding::Simple);
        assert_eq!(plain.class, ConcreteClass::II);
        assert_eq!(plain.annotation, "DT 11/300");

        let transformer = PoleOptions {
            transformer_kva: Some(150.0),
            heavy_conductor: true,
            ..PoleOptions::default()
        };
        let equipped = dimension_pole(&config, PoleFunction::Equipment, &transformer);
        assert_eq!(equipped.height_m, 12.0);
        assert_eq!(equipped.resistance_dan, 1000);
        assert_eq!(equipped.embedding, Embedding::Concreted);
        assert_eq!(equipped.annotation, "DT 12/1000");

        let big = PoleOptions {
            transformer_kva: Some(300.0),
            ..PoleOptions::default()
        };
        assert_eq!(dimension_pole(&config, PoleFunction::Tangent, &big).resistance_dan, 1500);

        let end = dimension_pole(&config, PoleFunction::EndOfLine, &PoleOptions::default());
        assert_eq!(end.resistance_dan, 600);
        let mono = ProjectConfig {
            nature: NetworkNature::Monophase,
            ..config.clone()
        };
        assert_eq!(
            dimension_pole(&mono, PoleFunction::Derivation, &PoleOptions::default()).resistance_dan,
            300
        );
    }

    #[test]
    fn concrete_class_follows_corrosion_zone() {
        let mut config = urban_conventional();
        config.corrosion_zone = CorrosionZone::P1;
        let tangent = dimension_pole(&config, PoleFunction::Tangent, &PoleOptions::default());
        let anchor = dimension_pole(&config, PoleFunction::Anchor, &PoleOptions::default());
        assert_eq!(tangent.class, ConcreteClass::II);
        assert_eq!(anchor.class, ConcreteClass::IV);

        config.corrosion_zone = CorrosionZone::P2;
        let tangent = dimension_pole(&config, PoleFunction::Tangent, &PoleOptions::default());
        assert_eq!(tangent.class, ConcreteClass::IV);
    }

    #[test]
    fn rules_are_deterministic() {
        let config = urban_conventional();
        let options = PoleOptions {
            heavy_conductor: true,
            ..PoleOptions::default()
        };
        for function in [PoleFunction::Tangent, PoleFunction::Angle, PoleFunction::Anchor] {
            assert_eq!(
                dimension_pole(&config, function, &options),
                dimension_pole(&config, function, &options)
            );
            assert_eq!(
                select_structure(&config, function, 45.0, false),
                select_structure(&config, function, 45.0, false)
            );
        }
    }

    #[test]
    fn structure_tables() {
        let triphase = urban_conventional();
        assert_eq!(select_structure(&triphase, PoleFunction::Tangent, 0.0, false), "N1");
        assert_eq!(select_structure(&triphase, PoleFunction::Tangent, 35.0, false), "N2");
        assert_eq!(select_structure(&triphase, PoleFunction::Angle, 20.0, true), "N4");
        assert_eq!(select_structure(&triphase, PoleFunction::Anchor, 0.0, false), "N3");
        assert_eq!(select_structure(&triphase, PoleFunction::Equipment, 0.0, false), "N3");

        let mono = ProjectConfig {
            nature: NetworkNature::Monophase,
            ..triphase.clone()
        };
        assert_eq!(select_structure(&mono, PoleFunction::EndOfLine, 0.0, false), "U3");

        let compact = ProjectConfig {
            network_type: NetworkType::Compact,
            ..triphase
        };
        assert_eq!(select_structure(&compact, PoleFunction::Angle, 40.0, true), "CE1");
        assert_eq!(select_structure(&compact, PoleFunction::Anchor, 0.0, false), "CE3");

        assert_eq!(select_lv_structure(PoleFunction::Tangent), "SI1");
        assert_eq!(select_lv_structure(PoleFunction::Derivation), "SI3");
        assert_eq!(select_lv_structure(PoleFunction::EndOfLine), "SI4");
    }

    #[test]
    fn conductor_annotations() {
        let spec = select_conductor(&ProjectConfig::default());
        assert_eq!(spec.mv_annotation, "ABC 3 #1/0 AWG CAA");
        assert!(spec.lv_annotation.is_empty());

        let config = ProjectConfig {
            nature: NetworkNature::Monophase,
            network_type: NetworkType::Compact,
            corrosion_zone: CorrosionZone::P1,
            mv_conductor: "2 AWG".into(),
            with_low_voltage: true,
            ..ProjectConfig::default()
        };
        let spec = select_conductor(&config);
        assert_eq!(spec.mv_cable, "1/0 AWG");
        assert_eq!(spec.mv_annotation, "AC 2 #1/0 AWG XLPE");
        assert_eq!(spec.lv_annotation, "AN 1 #35(35) MULT");
    }

    #[test]
    fn heavy_conductor_detection() {
        assert!(is_heavy_conductor("4/0 AWG"));
        assert!(is_heavy_conductor("336,4 MCM"));
        assert!(is_heavy_conductor("185mm²"));
        assert!(!is_heavy_conductor("1/0 AWG"));
    }

    #[test]
    fn crossing_heights_and_grounding() {
        assert_eq!(
            crossing_clearance_height(CrossingLocation::Railway, VoltageLevel::Medium),
            Some(9.0)
        );
        assert_eq!(
            crossing_clearance_height(CrossingLocation::ElectrifiedRailway, VoltageLevel::Low),
            None
        );
        assert_eq!(
            crossing_clearance_height(CrossingLocation::Avenue, VoltageLevel::Low),
            Some(5.5)
        );
        assert!(!grounding_recommended(149.0));
        assert!(grounding_recommended(150.0));
        assert!(!grounding_required(199.0));
        assert!(grounding_required(200.0));
    }

    #[test]
    fn corrosion_materials() {
        let mut config = ProjectConfig::default();
        assert_eq!(
            select_corrosion_material(&config, CorrosionComponent::Conductor).material,
            "CAA"
        );
        config.corrosion_zone = CorrosionZone::P2;
        assert_eq!(
            select_corrosion_material(&config, CorrosionComponent::Pole).specification,
            "class IV"
        );
        assert_eq!(
            select_corrosion_material(&config, CorrosionComponent::Insulator).specification,
            "bushing min 25 kV"
        );
    }

    #[test]
    fn pole_function_thresholds() {
        assert_eq!(pole_function(10.0, false, false, false), PoleFunction::Tangent);
        assert_eq!(pole_function(31.0, false, false, false), PoleFunction::Angle);
        assert_eq!(pole_function(61.0, false, false, false), PoleFunction::Anchor);
        assert_eq!(pole_function(0.0, true, true, false), PoleFunction::EndOfLine);
        assert_eq!(pole_function(90.0, true, false, true), PoleFunction::Equipment);
    }

    #[test]
    fn validate_project_flags_spans_and_poles() {
        let config = urban_conventional();
        let poles = vec![pole("P1", 11.0, 300, true), pole("P2", 10.0, 200, false), pole("P3", 11.0, 300, true)];
        let conductors = vec![
            span("CMT-001", "P1", "P2", 85.0, VoltageLevel::Medium),
            span("CMT-002", "P2", "P3", 20.0, VoltageLevel::Medium),
        ];
        let result = validate_project(&poles, &conductors, &config);

        assert!(!result.valid);
        assert_eq!(result.errors().count(), 3);
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.infos().count(), 3);
        assert!(result
            .errors()
            .any(|f| f.field == "conductor.CMT-001.length"));
    }

    #[test]
    fn findings_without_errors_are_still_valid() {
        let config = urban_conventional();
        let poles = vec![pole("P1", 11.0, 300, true), pole("P2", 11.0, 300, false)];
        let conductors = vec![span("CMT-001", "P1", "P2", 25.0, VoltageLevel::Medium)];
        let result = validate_project(&poles, &conductors, &config);
        assert!(result.valid);
        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn grounding_walk_resets_on_grounded_poles() {
        let config = urban_conventional();
        let poles: Vec<PoleRecord> = (0..6)
            .map(|i| pole(&format!("P{i}"), 11.0, 300, i == 0))
            .collect();
        let mut conductors: Vec<ConductorRecord> = (0..5)
            .map(|i| {
                span(
                    &format!("CMT-{i}"),
                    &format!("P{i}"),
                    &format!("P{}", i + 1),
                    60.0,
                    VoltageLevel::Medium,
                )
            })
            .collect();
        // Low-voltage spans share the poles and must not double count.
        conductors.push(span("CBT-0", "P0", "P1", 60.0, VoltageLevel::Low));

        let result = validate_project(&poles, &conductors, &config);
        let grounding: Vec<_> = result
            .warnings()
            .filter(|f| f.field == "grounding")
            .collect();
        assert_eq!(grounding.len(), 1);
        assert_eq!(grounding[0].actual, json!(240.0));

        let mut grounded = poles.clone();
        grounded[3].grounded = true;
        let result = validate_project(&grounded, &conductors, &config);
        assert_eq!(result.warnings().filter(|f| f.field == "grounding").count(), 0);
    }
}
