use crate::input::StereoMode;

/// Tunables of the stereo frame loop.
#[derive(Debug, Clone)]
pub struct StereoConfig {
    /// Mode the loop starts in.
    pub initial_mode: StereoMode,

    /// Angular offset per eye, in radians, scaled by the mode factor.
    pub separation: f32,

    /// Rotation added after every presented frame, in radians.
    ///
    /// Frame-count based: a faster display spins the cube faster.
    pub rotation_step: f32,

    /// Background of both layers and of the window.
    pub clear_color: wgpu::Color,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            initial_mode: StereoMode::POSITIVE,
            separation: 0.05,
            rotation_step: 0.01,
            clear_color: wgpu::Color::BLACK,
        }
    }
}
