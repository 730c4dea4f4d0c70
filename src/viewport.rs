//! Display surface scaling
//!
//! The world has a fixed logical size; the window does not. The background
//! covers the viewport (crop, never letterbox) while the game canvas fits
//! inside it with its aspect ratio preserved.

use glam::Vec2;

/// Uniform scale that makes a `world`-sized background cover `viewport`
pub fn cover_scale(viewport: Vec2, world: Vec2) -> f32 {
    (viewport.x / world.x).max(viewport.y / world.y)
}

/// Largest size with the world's aspect ratio that fits inside `viewport`
pub fn fit_size(viewport: Vec2, world: Vec2) -> Vec2 {
    let window_ratio = viewport.x / viewport.y;
    let game_ratio = world.x / world.y;
    if window_ratio < game_ratio {
        Vec2::new(viewport.x, viewport.x / game_ratio)
    } else {
        Vec2::new(viewport.y * game_ratio, viewport.y)
    }
}

/// World-to-screen mapping for a canvas fitted and centered in a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen offset of the world origin
    pub origin: Vec2,
    /// Screen units per world unit
    pub scale: Vec2,
}

impl Viewport {
    /// Fit `world` into `screen`, centered. `cell_aspect` stretches the
    /// vertical axis for non-square pixels (terminal cells are ~2:1, pass
    /// 2.0 there and 1.0 for a canvas).
    pub fn fit(screen: Vec2, world: Vec2, cell_aspect: f32) -> Self {
        let square_screen = Vec2::new(screen.x, screen.y * cell_aspect);
        let fitted = fit_size(square_screen, world);
        let scale = fitted.x / world.x;
        let size = Vec2::new(fitted.x, fitted.y / cell_aspect);
        Self {
            origin: (screen - size) / 2.0,
            scale: Vec2::new(scale, scale / cell_aspect),
        }
    }

    /// Scale `world` uniformly until it covers all of `screen`, centered.
    /// Whatever overhangs the screen edges is cropped.
    pub fn cover(screen: Vec2, world: Vec2, cell_aspect: f32) -> Self {
        let square_screen = Vec2::new(screen.x, screen.y * cell_aspect);
        let scale = cover_scale(square_screen, world);
        let size = Vec2::new(world.x * scale, world.y * scale / cell_aspect);
        Self {
            origin: (screen - size) / 2.0,
            scale: Vec2::new(scale, scale / cell_aspect),
        }
    }

    pub fn to_screen(&self, world_pos: Vec2) -> Vec2 {
        self.origin + world_pos * self.scale
    }

    pub fn to_world(&self, screen_pos: Vec2) -> Vec2 {
        (screen_pos - self.origin) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2::new(1920.0, 1080.0);

    #[test]
    fn test_cover_scale_uses_larger_ratio() {
        assert_eq!(cover_scale(Vec2::new(1920.0, 1080.0), WORLD), 1.0);
        // Tall phone screen: height dominates
        let s = cover_scale(Vec2::new(390.0, 844.0), WORLD);
        assert!((s - 844.0 / 1080.0).abs() < 1e-6);
        // Ultra-wide: width dominates
        let s = cover_scale(Vec2::new(3440.0, 1440.0), WORLD);
        assert!((s - 3440.0 / 1920.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_size_letterboxes() {
        assert_eq!(fit_size(Vec2::new(960.0, 1000.0), WORLD), Vec2::new(960.0, 540.0));
        let wide = fit_size(Vec2::new(4000.0, 1080.0), WORLD);
        assert!((wide - WORLD).length() < 1e-3);
    }

    #[test]
    fn test_viewport_roundtrip_and_centering() {
        let vp = Viewport::fit(Vec2::new(1000.0, 1000.0), WORLD, 1.0);
        let top_left = vp.to_screen(Vec2::ZERO);
        let bottom_right = vp.to_screen(WORLD);
        assert!((top_left.y - (1000.0 - bottom_right.y)).abs() < 1e-3);
        assert!((bottom_right.x - 1000.0).abs() < 1e-3);

        let p = Vec2::new(123.0, 456.0);
        assert!((vp.to_world(vp.to_screen(p)) - p).length() < 1e-3);
    }

    #[test]
    fn test_cover_crops_instead_of_letterboxing() {
        for screen in [
            Vec2::new(1000.0, 1000.0),
            Vec2::new(390.0, 844.0),
            Vec2::new(3440.0, 1440.0),
        ] {
            let vp = Viewport::cover(screen, WORLD, 1.0);
            let top_left = vp.to_screen(Vec2::ZERO);
            let bottom_right = vp.to_screen(WORLD);
            assert!(top_left.x <= 1e-3 && top_left.y <= 1e-3);
            assert!(bottom_right.x >= screen.x - 1e-3 && bottom_right.y >= screen.y - 1e-3);
            // Centered: equal overhang on opposite edges
            assert!((top_left.x + (bottom_right.x - screen.x)).abs() < 1e-2);
            assert!((top_left.y + (bottom_right.y - screen.y)).abs() < 1e-2);
        }
        // Square screen: height fits exactly, width overhangs
        let vp = Viewport::cover(Vec2::new(1000.0, 1000.0), WORLD, 1.0);
        assert!((vp.scale.x - 1000.0 / 1080.0).abs() < 1e-6);
        assert!(vp.origin.x < 0.0);
        assert!(vp.origin.y.abs() < 1e-3);
    }

    #[test]
    fn test_cover_terminal_cells() {
        // 80x40 cells at 2:1 is 80x80 square, taller than 16:9
        let vp = Viewport::cover(Vec2::new(80.0, 40.0), WORLD, 2.0);
        let tl = vp.to_screen(Vec2::ZERO);
        let br = vp.to_screen(WORLD);
        assert!(tl.y.abs() < 1e-3 && (br.y - 40.0).abs() < 1e-3);
        assert!(tl.x < 0.0 && br.x > 80.0);
    }

    #[test]
    fn test_terminal_cells() {
        // 160x45 cells at 2:1 is a 160x90 square area, exactly 16:9
        let vp = Viewport::fit(Vec2::new(160.0, 45.0), WORLD, 2.0);
        let br = vp.to_screen(WORLD);
        assert!((br.x - 160.0).abs() < 1e-3);
        assert!((br.y - 45.0).abs() < 1e-3);
    }
}
