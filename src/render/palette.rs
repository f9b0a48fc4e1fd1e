use crate::view::ColorMode;
use shared::{NormalizedProcess, ProcessStatus, Provider};

pub const NO_DATA_MESSAGE: &str = "No process data available";

pub fn status_color(status: ProcessStatus) -> &'static str {
    match status {
        ProcessStatus::Normal => "#2E7D32",
        ProcessStatus::Terminated => "#757575",
        ProcessStatus::Suspicious => "#FF9800",
        ProcessStatus::Malicious => "#D32F2F",
    }
}

pub fn provider_color(provider: &Provider) -> &'static str {
    match provider {
        Provider::CrowdStrike => "#F82B60",
        Provider::SentinelOne => "#00BFB3",
        Provider::Defender => "#0078D4",
        Provider::Other(_) => "#808080",
    }
}

/// Fill color of a node under the active color mode.
pub fn node_color(process: &NormalizedProcess, mode: ColorMode) -> &'static str {
    match mode {
        ColorMode::Status => status_color(process.status),
        ColorMode::Provider => provider_color(&process.provider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_follows_mode() {
        let p = NormalizedProcess::new(Some("1"), "a", Provider::SentinelOne)
            .with_status(ProcessStatus::Malicious);
        assert_eq!(node_color(&p, ColorMode::Status), "#D32F2F");
        assert_eq!(node_color(&p, ColorMode::Provider), "#00BFB3");
        assert_eq!(provider_color(&Provider::from_tag("carbonblack")), "#808080");
    }
}
