use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "libav")]
use crate::adapters::ProbeLibavAdapter;
#[cfg(not(feature = "libav"))]
use crate::adapters::FFprobeAdapter;
use crate::adapters::{
    FFmpegCompositor, FFmpegDecodeAdapter, LocalFsAdapter, TracingLogAdapter,
};
use crate::analysis::DynamicBeatTracker;
use crate::app::{AssemblyInteractor, BeatInteractor, StudioInteractor};
use crate::config::CutterConfig;
use crate::domain::errors::DomainError;
use crate::ports::{
    AudioDecodePort, BeatTrackPort, CompositorPort, FsPort, LogLevel, LogPort, ProbePort,
};

pub trait AppContainer: Send + Sync {
    fn beat_interactor(&self) -> Arc<BeatInteractor>;
    fn assembly_interactor(&self) -> Arc<AssemblyInteractor>;
    fn studio_interactor(&self) -> Arc<StudioInteractor>;
    fn fs_port(&self) -> Arc<dyn FsPort>;
}

pub struct DefaultAppContainer {
    beat_interactor: Arc<BeatInteractor>,
    assembly_interactor: Arc<AssemblyInteractor>,
    studio_interactor: Arc<StudioInteractor>,
    fs_port: Arc<dyn FsPort>,
}

impl DefaultAppContainer {
    /// Wire the production adapters for `config`
    pub fn new(config: &CutterConfig) -> Result<Self, DomainError> {
        #[cfg(feature = "libav")]
        let probe_port: Arc<dyn ProbePort> = Arc::new(ProbeLibavAdapter::new()?);
        #[cfg(not(feature = "libav"))]
        let probe_port: Arc<dyn ProbePort> =
            Arc::new(FFprobeAdapter::new(config.tools.ffprobe.clone()));

        let decode_port: Arc<dyn AudioDecodePort> =
            Arc::new(FFmpegDecodeAdapter::new(config.tools.ffmpeg.clone()));
        let track_port: Arc<dyn BeatTrackPort> =
            Arc::new(DynamicBeatTracker::from_config(&config.analysis));
        let compositor_port: Arc<dyn CompositorPort> = Arc::new(FFmpegCompositor::new(
            config.tools.ffmpeg.clone(),
            config.encoding.clone(),
        ));
        let fs_port: Arc<dyn FsPort> = Arc::new(LocalFsAdapter::new());
        let log_port: Arc<dyn LogPort> =
            Arc::new(TracingLogAdapter::new(LogLevel::parse(&config.log_level)?));

        let beat_interactor = Arc::new(BeatInteractor::new(
            decode_port,
            track_port,
            Arc::clone(&log_port),
            config.analysis.clone(),
        ));

        let assembly_interactor = Arc::new(AssemblyInteractor::new(
            probe_port,
            compositor_port,
            Arc::clone(&log_port),
        ));

        let studio_interactor = Arc::new(StudioInteractor::new(
            Arc::clone(&beat_interactor),
            Arc::clone(&assembly_interactor),
            Arc::clone(&fs_port),
            Arc::clone(&log_port),
            PathBuf::from(&config.output.directory),
        ));

        Ok(Self {
            beat_interactor,
            assembly_interactor,
            studio_interactor,
            fs_port,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn beat_interactor(&self) -> Arc<BeatInteractor> {
        Arc::clone(&self.beat_interactor)
    }

    fn assembly_interactor(&self) -> Arc<AssemblyInteractor> {
        Arc::clone(&self.assembly_interactor)
    }

    fn studio_interactor(&self) -> Arc<StudioInteractor> {
        Arc::clone(&self.studio_interactor)
    }

    fn fs_port(&self) -> Arc<dyn FsPort> {
        Arc::clone(&self.fs_port)
    }
}
