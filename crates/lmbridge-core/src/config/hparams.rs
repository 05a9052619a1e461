use serde::{Deserialize, Serialize};

/// Sampler knobs handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerParams {
    pub seed: u64,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub min_keep: u32,
    pub penalty_last_n: u32,
    pub penalty_repeat: f64,
    pub penalty_freq: f64,
    pub penalty_present: f64,
    pub penalize_nl: bool,
    pub ignore_eos: bool,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            seed: 233,
            temperature: 0.2,
            top_p: 0.9,
            top_k: 40,
            min_keep: 0,
            penalty_last_n: 1024,
            penalty_repeat: 1.1,
            penalty_freq: 0.0,
            penalty_present: 0.0,
            penalize_nl: false,
            ignore_eos: false,
        }
    }
}

/// Contents of `hparams.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperParams {
    pub n_threads: u32,
    pub batch_size: u32,
    pub sampler: SamplerParams,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            n_threads: 4,
            batch_size: 1024,
            sampler: SamplerParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let parsed: HyperParams =
            serde_json::from_str(r#"{"n_threads": 8, "sampler": {"top_k": 20}}"#).unwrap();
        assert_eq!(parsed.n_threads, 8);
        assert_eq!(parsed.batch_size, 1024);
        assert_eq!(parsed.sampler.top_k, 20);
        assert_eq!(parsed.sampler.seed, 233);
    }

    #[test]
    fn serializes_nested_sampler() {
        let value = serde_json::to_value(HyperParams::default()).unwrap();
        assert_eq!(value["sampler"]["penalty_last_n"], 1024);
        assert_eq!(value["sampler"]["ignore_eos"], false);
    }
}
