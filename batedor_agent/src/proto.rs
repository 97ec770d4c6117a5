//! JSON pushed to remote subscribers, one object per broadcast.
//! Field names are the wire contract of the companion viewer; keep them stable.

use serde::{Deserialize, Serialize};

/// Most processes a single push carries.
pub const MAX_PUSHED_PROCS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(rename = "CPU")]
    pub cpu: CpuPayload,
    #[serde(rename = "Mem")]
    pub mem: MemPayload,
    #[serde(rename = "Net")]
    pub net: NetPayload,
    #[serde(rename = "Procs")]
    pub procs: Vec<ProcPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuPayload {
    #[serde(rename = "Cores")]
    pub cores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemPayload {
    #[serde(rename = "UsedPercent")]
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetPayload {
    #[serde(rename = "DownloadRate")]
    pub download_rate: String,
    #[serde(rename = "UploadRate")]
    pub upload_rate: String,
    #[serde(rename = "PublicIP")]
    pub public_ip: String,
    /// Milliseconds, -1 when the last probe failed.
    #[serde(rename = "Latency")]
    pub latency: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcPayload {
    #[serde(rename = "PID")]
    pub pid: i32,
    pub user: String,
    #[serde(rename = "CPU")]
    pub cpu: f64,
    pub mem: f32,
    pub command: String,
}
