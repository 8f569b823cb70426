//! Error types for startup: config, assets, GPU init.

use std::path::PathBuf;

use thiserror::Error;

use crate::animation::AnimationState;

/// Errors raised while loading or slicing image assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// File missing, unreadable or not a decodable image
    #[error("failed to load image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Sheet smaller than the declared grid
    #[error(
        "sprite sheet {} is {actual_width}x{actual_height}, but a {columns}x{rows} grid of {cell_width}x{cell_height} cells needs {}x{}",
        .path.display(),
        .columns * .cell_width,
        .rows * .cell_height
    )]
    Undersized {
        path: PathBuf,
        actual_width: u32,
        actual_height: u32,
        cell_width: u32,
        cell_height: u32,
        columns: u32,
        rows: u32,
    },

    /// Zero columns, rows or cell size
    #[error("sprite sheet {} declares an empty grid ({columns}x{rows} cells of {cell_width}x{cell_height})", .path.display())]
    EmptyGrid {
        path: PathBuf,
        cell_width: u32,
        cell_height: u32,
        columns: u32,
        rows: u32,
    },
}

/// Errors raised while reading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("state {0} needs exactly one of `sheet` or `frames_from`")]
    FrameSource(AnimationState),

    #[error("state {state} borrows frames from {target}, which has no sheet of its own")]
    AliasWithoutSheet {
        state: AnimationState,
        target: AnimationState,
    },

    #[error("key '{key}' is bound to both {first} and {second}")]
    DuplicateKey {
        key: char,
        first: AnimationState,
        second: AnimationState,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} does not fit in 32 bits")]
    Overflow(&'static str),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors raised while bringing up the GPU.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error(transparent)]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error(transparent)]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
}

/// Top-level fatal error. Any of these ends the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undersized_message_names_path_and_required_size() {
        let err = AssetError::Undersized {
            path: PathBuf::from("assets/Dancing.png"),
            actual_width: 60,
            actual_height: 60,
            cell_width: 30,
            cell_height: 30,
            columns: 3,
            rows: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("assets/Dancing.png"), "{msg}");
        assert!(msg.contains("needs 90x60"), "{msg}");
    }
}
