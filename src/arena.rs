use vecpool_common::{ArenaConfig, CoordinatePair, Stable, Transient, Vector};

/// A wall segment from `start` to `start + span`.
#[derive(Debug)]
pub struct Wall {
    pub start: Vector<Stable>,
    pub span: Vector<Stable>,
    /// Unit left normal of `span`.
    pub normal: Vector<Stable>,
}

/// Where a move first crosses a wall.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub wall: usize,
    pub point: CoordinatePair,
}

impl Wall {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let span = Vector::stable(x2 - x1, y2 - y1);
        let mut normal = span.left_normal();
        normal.normalize();
        Wall { start: Vector::stable(x1, y1), span, normal }
    }

    /// Unit normal pointing to the side of the wall `point` is on.
    /// Points on the wall line get the left normal.
    pub fn normal_facing(&self, point: &Vector<Stable>) -> Vector<Transient> {
        let end = &self.start + &self.span;
        // Positive side is the one the left normal points away from.
        if point.sign(&self.start, end) > 0 {
            -&self.normal
        } else {
            self.normal.to_transient()
        }
    }
}

/// Boundary rectangle `(0, 0)-(width, height)` wound as a closed loop, so every
/// corner is the end point of exactly one wall, followed by the obstacles.
pub fn build_walls(arena: &ArenaConfig) -> Vec<Wall> {
    let (w, h) = (arena.width, arena.height);
    let mut walls = vec![
        Wall::new(0.0, 0.0, w, 0.0),
        Wall::new(w, 0.0, w, h),
        Wall::new(w, h, 0.0, h),
        Wall::new(0.0, h, 0.0, 0.0),
    ];
    walls.extend(arena.obstacles.iter().map(|&[x1, y1, x2, y2]| Wall::new(x1, y1, x2, y2)));
    walls
}

/// Nearest wall crossed by the move `from -> from + step`, if any.
///
/// A move starting exactly on a wall does not hit that wall again.
pub fn first_hit(walls: &[Wall], from: &Vector<Stable>, step: &Vector<Stable>) -> Option<Contact> {
    let mut probe = Vector::stable(0.0, 0.0);
    let mut best: Option<(f64, Contact)> = None;

    for (idx, wall) in walls.iter().enumerate() {
        step.find_intersection_in_bounds_into(from, &wall.start, &wall.span, &mut probe);
        if !probe.is_valid() {
            continue;
        }
        let dist_sq = from.dist_squared(&probe);
        if best.as_ref().map_or(true, |(best_sq, _)| dist_sq < *best_sq) {
            best = Some((dist_sq, Contact { wall: idx, point: probe.coords() }));
        }
    }
    best.map(|(_, contact)| contact)
}
