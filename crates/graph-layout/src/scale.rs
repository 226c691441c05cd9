use crate::Vec2;

/// Final size of a layout and the factor applied to every position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub size: Vec2,
    pub scale: f32,
}

/// Reconcile the natural size of a layout with the requested canvas size
///
/// With `ignore_size` the canvas follows the content. Otherwise the content
/// is scaled uniformly so it fits the requested size, keeping its aspect
/// ratio. An empty layout keeps the requested size.
pub fn fit(natural: Vec2, requested: Vec2, ignore_size: bool) -> Fit {
    if ignore_size {
        return Fit {
            size: natural,
            scale: 1.0,
        };
    }

    if natural.is_degenerate() {
        return Fit {
            size: requested,
            scale: 1.0,
        };
    }

    let scale = (requested.x / natural.x).min(requested.y / natural.y);
    Fit {
        size: natural * scale,
        scale,
    }
}
