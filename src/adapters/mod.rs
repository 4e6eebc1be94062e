// Adapters - External system implementations

pub(crate) mod process;

pub mod decode_ffmpeg;
pub mod exec_ffmpeg;
pub mod fs_local;
pub mod probe_ffprobe;
#[cfg(feature = "libav")]
pub mod probe_libav;
pub mod random;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use decode_ffmpeg::FFmpegDecodeAdapter;
pub use exec_ffmpeg::FFmpegCompositor;
pub use fs_local::LocalFsAdapter;
pub use probe_ffprobe::FFprobeAdapter;
#[cfg(feature = "libav")]
pub use probe_libav::ProbeLibavAdapter;
pub use random::RngRandomSource;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
