//! GPU device + surface management.
//!
//! [`Gpu`] owns the wgpu device, queue and window swapchain and hands out one
//! [`GpuFrame`] per rendered frame. [`report_gpu_errors`] wraps a setup step
//! or a frame's recording in validation, out-of-memory and internal error
//! scopes; anything raised outside a scope goes to [`log_uncaptured_errors`].

mod context;
mod error;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use error::{
    capture_gpu_errors, log_uncaptured_errors, report_gpu_errors, SurfaceErrorAction,
};
pub use init::GpuInit;

/// Adapter-free device for tests; validation still runs.
#[cfg(test)]
pub(crate) fn noop_device() -> (wgpu::Device, wgpu::Queue) {
    wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
}
