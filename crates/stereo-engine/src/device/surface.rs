use anyhow::Context;
use winit::dpi::PhysicalSize;

use super::{GpuInit, SurfaceErrorAction};

/// Window surface plus the configuration it was last configured with.
///
/// The tracked size always follows the window, including 0x0 while minimized;
/// the surface itself is only reconfigured for non-zero sizes.
pub(crate) struct Swapchain<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> Swapchain<'w> {
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> anyhow::Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format =
            pick_format(&caps.formats, init.prefer_srgb).context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: pick_alpha_mode(&caps.alpha_modes, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);

        log::debug!(
            "surface: {format:?} {}x{} {:?}",
            config.width,
            config.height,
            config.present_mode
        );

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if is_zero(new_size) {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(device, &self.config);
    }

    pub(crate) fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Maps a failed acquisition to what the frame loop should do next,
    /// reconfiguring the surface where that is the fix.
    pub(crate) fn recover(
        &self,
        device: &wgpu::Device,
        err: wgpu::SurfaceError,
    ) -> SurfaceErrorAction {
        let action = classify(&err);
        match action {
            SurfaceErrorAction::Reconfigured if !is_zero(self.size) => {
                self.surface.configure(device, &self.config);
            }
            SurfaceErrorAction::SkipFrame => {
                log::debug!("surface acquire failed ({err}); skipping frame");
            }
            SurfaceErrorAction::Fatal => log::error!("surface acquire failed: {err}"),
            _ => {}
        }
        action
    }
}

fn is_zero(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}

fn classify(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// First format whose sRGB-ness matches the preference, else the first reported one.
fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| formats.first().copied())
}

fn pick_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as Alpha, TextureFormat as Fmt};

    // ── format selection ──────────────────────────────────────────────────

    #[test]
    fn srgb_is_preferred_when_available() {
        let formats = [Fmt::Bgra8Unorm, Fmt::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(Fmt::Rgba8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(Fmt::Bgra8Unorm));
    }

    #[test]
    fn default_init_skips_leading_srgb_format() {
        // Vulkan and Metal commonly list the sRGB variant first.
        let formats = [Fmt::Bgra8UnormSrgb, Fmt::Bgra8Unorm];
        let picked = pick_format(&formats, GpuInit::default().prefer_srgb);
        assert_eq!(picked, Some(Fmt::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        assert_eq!(pick_format(&[Fmt::Rgb10a2Unorm], true), Some(Fmt::Rgb10a2Unorm));
        assert_eq!(pick_format(&[], true), None);
    }

    #[test]
    fn unsupported_alpha_request_is_ignored() {
        let supported = [Alpha::Opaque];
        assert_eq!(pick_alpha_mode(&supported, Some(Alpha::PreMultiplied)), Alpha::Opaque);
        assert_eq!(pick_alpha_mode(&supported, None), Alpha::Opaque);
        assert_eq!(pick_alpha_mode(&[], None), Alpha::Auto);
    }

    // ── error classification ──────────────────────────────────────────────

    #[test]
    fn surface_errors_map_to_actions() {
        use wgpu::SurfaceError as E;
        assert_eq!(classify(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify(&E::Other), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify(&E::OutOfMemory), SurfaceErrorAction::Fatal);
    }

    #[test]
    fn zero_sized_drawables_are_detected() {
        assert!(is_zero(PhysicalSize::new(0, 400)));
        assert!(is_zero(PhysicalSize::new(800, 0)));
        assert!(!is_zero(PhysicalSize::new(1, 1)));
    }
}
