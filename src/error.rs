//! Error types for the render boundary.
//!
//! The morphing core itself has no recoverable errors (it is procedural
//! generation and arithmetic); everything here belongs to GPU setup and the
//! window loop.

use std::fmt;

/// Errors that can occur while setting up or driving the GPU renderer.
#[derive(Debug)]
pub enum RenderError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// A group's particle count exceeds the device's addressable buffer
    /// size. Surfaced at adapter construction, before any buffer is created.
    GroupTooLarge {
        /// Requested particle count.
        count: usize,
        /// Maximum count the device can address for this vertex layout.
        max: usize,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            RenderError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            RenderError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            RenderError::GroupTooLarge { count, max } => write!(
                f,
                "Particle group of {} exceeds the device buffer limit of {} particles",
                count, max
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::SurfaceCreation(e) => Some(e),
            RenderError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for RenderError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        RenderError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the interactive viewer.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Render(RenderError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::Render(e) => write!(f, "Render error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Render(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<RenderError> for ViewerError {
    fn from(e: RenderError) -> Self {
        ViewerError::Render(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_too_large_message() {
        let err = RenderError::GroupTooLarge {
            count: 10_000_000,
            max: 1_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("10000000"));
        assert!(msg.contains("1000000"));
    }
}
