use chrono::{TimeZone, Utc};

use super::*;


fn sample_experiment(id: i64, name: &str) -> Experiment {
    let stamp = Utc
        .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    Experiment {
        id: ExperimentId(id),
        created_at: stamp,
        updated_at: stamp,
        name: name.to_string(),
        variations: vec![
            sample_variation(id * 10, id, "control"),
            sample_variation(id * 10 + 1, id, "treatment"),
        ],
    }
}

fn sample_variation(id: i64, experiment_id: i64, name: &str) -> shared::protocol::Variation {
    let stamp = Utc
        .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    shared::protocol::Variation {
        id: VariationId(id),
        created_at: stamp,
        updated_at: stamp,
        name: name.to_string(),
        participants: 0,
        conversions: 0,
        experiment_id: ExperimentId(experiment_id),
    }
}

fn draft(name: &str) -> NewExperiment {
    NewExperiment {
        name: name.to_string(),
        variations: vec!["control".to_string(), "treatment".to_string()],
    }
}
