use std::sync::Arc;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Filters opened around every reported stage, outermost first.
const SCOPED_FILTERS: [wgpu::ErrorFilter; 3] = [
    wgpu::ErrorFilter::Validation,
    wgpu::ErrorFilter::OutOfMemory,
    wgpu::ErrorFilter::Internal,
];

/// Runs `f` with one error scope per filter open and returns the errors they caught.
///
/// Scopes are thread-local and popped innermost first.
pub fn capture_gpu_errors<R>(
    device: &wgpu::Device,
    f: impl FnOnce() -> R,
) -> (R, Vec<wgpu::Error>) {
    let scopes = SCOPED_FILTERS.map(|filter| device.push_error_scope(filter));
    let out = f();

    let mut errors = Vec::new();
    for scope in scopes.into_iter().rev() {
        errors.extend(pollster::block_on(scope.pop()));
    }
    (out, errors)
}

/// Runs `f` inside error scopes and reports any captured error.
///
/// Errors are advisory: they are logged with `stage` and never alter control
/// flow. Returns whatever `f` returns.
pub fn report_gpu_errors<R>(device: &wgpu::Device, stage: &str, f: impl FnOnce() -> R) -> R {
    let (out, errors) = capture_gpu_errors(device, f);
    for err in errors {
        log::error!("GPU error: {err} - {stage}");
    }
    out
}

/// Logs errors raised outside any open scope instead of panicking.
pub fn log_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Arc::new(|err: wgpu::Error| {
        log::error!("GPU error: {err} - uncaptured");
    }));
}
