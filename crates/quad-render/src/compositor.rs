//! Per-frame render composition.
//!
//! [`compose_frame`] decides which scene passes run and where the onboard
//! view lands on screen. The result is a plain [`FramePlan`] a GPU backend
//! walks in order.

use crate::camera::CameraHandle;
use crate::pip::PipCameraState;
use quad_config::{PipAnchor, PipConfig};
use serde::Serialize;

/// Surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderTarget {
    Surface,
    /// Texture the onboard camera renders into before compositing.
    Offscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderPass {
    /// Draw the scene from `camera` into `target`.
    Scene {
        camera: CameraHandle,
        target: RenderTarget,
    },
    /// Draw the offscreen texture as a screen-space quad over the surface.
    Overlay { rect: ScreenRect },
}

/// Ordered passes for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FramePlan {
    pub passes: Vec<RenderPass>,
}

impl FramePlan {
    pub fn overlay_rect(&self) -> Option<ScreenRect> {
        self.passes.iter().find_map(|pass| match pass {
            RenderPass::Overlay { rect } => Some(*rect),
            RenderPass::Scene { .. } => None,
        })
    }
}

/// Where the onboard view sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipLayout {
    pub anchor: PipAnchor,
    pub margin_px: u32,
    /// Overlay width as a fraction of the viewport width.
    pub width_fraction: f32,
}

impl PipLayout {
    pub fn from_config(config: &PipConfig) -> Self {
        Self {
            anchor: config.anchor,
            margin_px: config.margin_px,
            width_fraction: config.width_fraction,
        }
    }

    /// Overlay rectangle for `viewport`, keeping the viewport's aspect ratio
    /// and staying on screen.
    pub fn rect(&self, viewport: Viewport) -> ScreenRect {
        let fraction = self.width_fraction.clamp(0.05, 1.0);
        let max_width = viewport.width.saturating_sub(2 * self.margin_px);
        let max_height = viewport.height.saturating_sub(2 * self.margin_px);
        let width = ((viewport.width as f32 * fraction).round() as u32).min(max_width);
        let height = ((width as f32 / viewport.aspect_ratio()).round() as u32).min(max_height);

        let left = self.margin_px;
        let right = viewport.width.saturating_sub(self.margin_px + width);
        let top = self.margin_px;
        let bottom = viewport.height.saturating_sub(self.margin_px + height);
        let (x, y) = match self.anchor {
            PipAnchor::TopLeft => (left, top),
            PipAnchor::TopRight => (right, top),
            PipAnchor::BottomLeft => (left, bottom),
            PipAnchor::BottomRight => (right, bottom),
        };
        ScreenRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Plan one frame: the main view always, plus the onboard view when active.
pub fn compose_frame(
    pip: &PipCameraState,
    main: CameraHandle,
    viewport: Viewport,
    layout: &PipLayout,
) -> FramePlan {
    let mut passes = Vec::with_capacity(3);
    let onboard = pip.camera().filter(|_| pip.is_active());
    if let Some(camera) = onboard {
        passes.push(RenderPass::Scene {
            camera,
            target: RenderTarget::Offscreen,
        });
    }
    passes.push(RenderPass::Scene {
        camera: main,
        target: RenderTarget::Surface,
    });
    if onboard.is_some() {
        passes.push(RenderPass::Overlay {
            rect: layout.rect(viewport),
        });
    }
    FramePlan { passes }
}
