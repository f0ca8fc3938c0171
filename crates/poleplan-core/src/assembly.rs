//! Turn placed anchors into pole and conductor records.

use crate::models::{
    Anchor, AnchorKind, ConductorRecord, PoleFunction, PoleRecord, ProjectConfig, VoltageLevel,
};
use crate::rules::{
    dimension_pole, is_heavy_conductor, select_conductor, select_lv_structure, select_structure,
    validate_project, ConductorSpec, PoleOptions, ProjectValidation, ANGLE_DEFLECTION_DEG,
};
use crate::spatial::{deflection_angle, haversine_distance};
use serde::{Deserialize, Serialize};

/// Deflection above which an intermediate pole becomes an angle pole.
const ANGLE_POLE_DEFLECTION_DEG: f64 = 15.0;
/// Neighbours closer than this give no usable turning angle.
const MIN_DEFLECTION_SPAN_M: f64 = 0.01;

/// Equipment to mount while assembling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    #[serde(default)]
    pub transformer_kva: Option<f64>,
    /// Index of the anchor that carries the transformer.
    #[serde(default)]
    pub transformer_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLayout {
    pub poles: Vec<PoleRecord>,
    pub conductors: Vec<ConductorRecord>,
    pub conductor_spec: ConductorSpec,
    pub mv_length_m: f64,
    pub lv_length_m: f64,
}

impl ProjectLayout {
    pub fn validate(&self, config: &ProjectConfig) -> ProjectValidation {
        validate_project(&self.poles, &self.conductors, config)
    }
}

fn deflection_at(anchors: &[Anchor], index: usize) -> f64 {
    if index == 0 || index + 1 >= anchors.len() {
        return 0.0;
    }
    let (prev, here, next) = (
        anchors[index - 1].coordinate,
        anchors[index].coordinate,
        anchors[index + 1].coordinate,
    );
    if haversine_distance(prev, here) < MIN_DEFLECTION_SPAN_M
        || haversine_distance(here, next) < MIN_DEFLECTION_SPAN_M
    {
        return 0.0;
    }
    deflection_angle(prev, here, next)
}

/// Function of the pole at `index`. The first pole anchors the line and the
/// last one ends it; crossing poles are always anchors.
fn assembly_function(
    anchor: &Anchor,
    index: usize,
    total: usize,
    deflection_deg: f64,
    has_transformer: bool,
) -> PoleFunction {
    if has_transformer {
        PoleFunction::Equipment
    } else if index == 0 {
        PoleFunction::Anchor
    } else if index + 1 == total {
        PoleFunction::EndOfLine
    } else if anchor.kind.is_crossing() {
        PoleFunction::Anchor
    } else if deflection_deg > ANGLE_POLE_DEFLECTION_DEG {
        PoleFunction::Angle
    } else {
        PoleFunction::Tangent
    }
}

fn pole_id(index: usize) -> String {
    format!("P{:03}", index + 1)
}

/// Build the pole list and one conductor per span (two when low voltage is conjugated).
pub fn assemble_project(
    anchors: &[Anchor],
    config: &ProjectConfig,
    options: &AssemblyOptions,
) -> ProjectLayout {
    let conductor_spec = select_conductor(config);
    let heavy_conductor = is_heavy_conductor(&conductor_spec.mv_cable);
    let total = anchors.len();

    let poles: Vec<PoleRecord> = anchors
        .iter()
        .enumerate()
        .map(|(index, anchor)| {
            let deflection = deflection_at(anchors, index);
            let transformer_kva = options
                .transformer_kva
                .filter(|_| options.transformer_index == Some(index));
            let function =
                assembly_function(anchor, index, total, deflection, transformer_kva.is_some());
            let dimensioning = dimension_pole(
                config,
                function,
                &PoleOptions {
                    transformer_kva,
                    heavy_conductor,
                    ..PoleOptions::default()
                },
            );
            let is_endpoint = matches!(anchor.kind, AnchorKind::Origin | AnchorKind::Destination);

            PoleRecord {
                id: pole_id(index),
                coordinate: anchor.coordinate,
                function,
                height_m: dimensioning.height_m,
                resistance_dan: dimensioning.resistance_dan,
                structure: select_structure(config, function, deflection, false).to_string(),
                lv_structure: config
                    .with_low_voltage
                    .then(|| select_lv_structure(function).to_string()),
                annotation: dimensioning.annotation,
                grounded: is_endpoint
                    || transformer_kva.is_some()
                    || function == PoleFunction::EndOfLine,
                transformer_kva,
                guyed: matches!(function, PoleFunction::EndOfLine | PoleFunction::Anchor)
                    || deflection > ANGLE_DEFLECTION_DEG,
                justification: anchor.justification.clone(),
            }
        })
        .collect();

    let mut conductors = Vec::new();
    let mut mv_length_m = 0.0;
    let mut lv_length_m = 0.0;
    for (index, pair) in poles.windows(2).enumerate() {
        let length_m = haversine_distance(pair[0].coordinate, pair[1].coordinate);
        conductors.push(ConductorRecord {
            id: format!("CMT-{:03}", index + 1),
            network: VoltageLevel::Medium,
            cable: conductor_spec.mv_cable.clone(),
            length_m,
            from_pole_id: pair[0].id.clone(),
            to_pole_id: pair[1].id.clone(),
        });
        mv_length_m += length_m;

        if config.with_low_voltage {
            conductors.push(ConductorRecord {
                id: format!("CBT-{:03}", index + 1),
                network: VoltageLevel::Low,
                cable: conductor_spec.lv_cable.clone(),
                length_m,
                from_pole_id: pair[0].id.clone(),
                to_pole_id: pair[1].id.clone(),
            });
            lv_length_m += length_m;
        }
    }

    tracing::debug!(
        poles = poles.len(),
        conductors = conductors.len(),
        mv_length_m,
        "project assembled"
    );

    ProjectLayout {
        poles,
        conductors,
        conductor_spec,
        mv_length_m,
        lv_length_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AreaType, Coordinate};
    use crate::spatial::offset_meters;

    const ORIGIN: Coordinate = Coordinate::new(-2.53, -44.30);

    fn anchor(coordinate: Coordinate, kind: AnchorKind) -> Anchor {
        Anchor {
            coordinate,
            kind,
            priority: 50.0,
            justification: format!("{kind:?}"),
            source: None,
        }
    }

    fn straight_anchors(count: usize, spacing_m: f64) -> Vec<Anchor> {
        (0..count)
            .map(|i| {
                let kind = if i == 0 {
                    AnchorKind::Origin
                } else if i + 1 == count {
                    AnchorKind::Destination
                } else {
                    AnchorKind::Intermediate
                };
                anchor(offset_meters(ORIGIN, 0.0, spacing_m * i as f64), kind)
            })
            .collect()
    }

    fn urban() -> ProjectConfig {
        ProjectConfig {
            area_type: AreaType::Urban,
            ..ProjectConfig::default()
        }
    }

    #[test]
    fn functions_follow_position_and_kind() {
        let mut anchors = straight_anchors(5, 50.0);
        anchors[2].kind = AnchorKind::CrossingBefore;
        let layout = assemble_project(&anchors, &urban(), &AssemblyOptions::default());

        let functions: Vec<_> = layout.poles.iter().map(|p| p.function).collect();
        assert_eq!(
            functions,
            vec![
                PoleFunction::Anchor,
                PoleFunction::Tangent,
                PoleFunction::Anchor,
                PoleFunction::Tangent,
                PoleFunction::EndOfLine,
            ]
        );
        assert_eq!(layout.poles[0].id, "P001");
        assert_eq!(layout.poles[1].structure, "N1");
        assert_eq!(layout.poles[4].structure, "N3");
        assert!(layout.poles[0].grounded && layout.poles[4].grounded);
        assert!(!layout.poles[1].grounded);
        assert!(layout.poles[2].guyed);
        assert!(!layout.poles[3].guyed);
    }

    #[test]
    fn turning_pole_becomes_angle() {
        let anchors = vec![
            anchor(ORIGIN, AnchorKind::Origin),
            anchor(offset_meters(ORIGIN, 0.0, 50.0), AnchorKind::Corner),
            anchor(offset_meters(ORIGIN, 50.0, 50.0), AnchorKind::Destination),
        ];
        let layout = assemble_project(&anchors, &urban(), &AssemblyOptions::default());
        assert_eq!(layout.poles[1].function, PoleFunction::Angle);
        assert_eq!(layout.poles[1].structure, "N2");
        assert!(layout.poles[1].guyed);
    }

    #[test]
    fn transformer_pole_is_equipment() {
        let anchors = straight_anchors(4, 40.0);
        let options = AssemblyOptions {
            transformer_kva: Some(75.0),
            transformer_index: Some(2),
        };
        let layout = assemble_project(&anchors, &urban(), &options);
        let pole = &layout.poles[2];
        assert_eq!(pole.function, PoleFunction::Equipment);
        assert_eq!(pole.height_m, 12.0);
        assert_eq!(pole.resistance_dan, 600);
        assert_eq!(pole.transformer_kva, Some(75.0));
        assert!(pole.grounded);
        assert_eq!(layout.poles[1].transformer_kva, None);
    }

    #[test]
    fn conjugated_line_gets_low_voltage_conductors() {
        let anchors = straight_anchors(3, 40.0);
        let config = ProjectConfig {
            with_low_voltage: true,
            ..urban()
        };
        let layout = assemble_project(&anchors, &config, &AssemblyOptions::default());

        let ids: Vec<_> = layout.conductors.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["CMT-001", "CBT-001", "CMT-002", "CBT-002"]);
        assert!((layout.mv_length_m - layout.lv_length_m).abs() < 1e-9);
        assert_eq!(layout.poles[1].lv_structure.as_deref(), Some("SI1"));
        assert_eq!(layout.poles[2].lv_structure.as_deref(), Some("SI4"));
    }

    #[test]
    fn heavy_conductor_reinforces_every_pole() {
        let anchors = straight_anchors(3, 40.0);
        let config = ProjectConfig {
            mv_conductor: "4/0 AWG".into(),
            ..urban()
        };
        let layout = assemble_project(&anchors, &config, &AssemblyOptions::default());
        assert!(layout.poles.iter().all(|p| p.resistance_dan == 600));
    }

    #[test]
    fn assembled_layout_validates() {
        let anchors = straight_anchors(6, 55.0);
        let config = urban();
        let layout = assemble_project(&anchors, &config, &AssemblyOptions::default());
        let validation = layout.validate(&config);
        assert!(validation.valid, "{:?}", validation.findings);
        // Four ungrounded spans add up to 220 m before the grounded last pole.
        assert_eq!(validation.warnings().filter(|f| f.field == "grounding").count(), 1);
    }

    #[test]
    fn empty_anchor_list_gives_empty_layout() {
        let layout = assemble_project(&[], &urban(), &AssemblyOptions::default());
        assert!(layout.poles.is_empty());
        assert!(layout.conductors.is_empty());
    }
}
