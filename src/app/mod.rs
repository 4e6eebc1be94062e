// Application layer - Use case interactors

pub mod assembly_interactor;
pub mod beat_interactor;
pub mod container;
pub mod studio_interactor;

// Re-export interactors
pub use assembly_interactor::AssemblyInteractor;
pub use beat_interactor::BeatInteractor;
pub use container::{AppContainer, DefaultAppContainer};
pub use studio_interactor::{StudioInteractor, StudioRequest, StudioResponse};
