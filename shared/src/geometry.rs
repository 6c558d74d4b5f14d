//! Nearest-point queries against tunnel polylines.

use crate::vector::Vector2;

/// Result of projecting a point onto a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Closest point lying on the polyline.
    pub point: Vector2,
    /// Squared distance between the query point and `point`.
    pub distance_squared: f32,
    /// Index of the segment (starting vertex) the point lies on.
    pub segment: usize,
}

impl Projection {
    pub fn distance(&self) -> f32 {
        self.distance_squared.sqrt()
    }
}

/// Borrowed view of an ordered vertex list describing an underground path.
#[derive(Debug, Clone, Copy)]
pub struct TunnelPath<'a> {
    vertices: &'a [[f32; 2]],
}

impl<'a> TunnelPath<'a> {
    pub fn new(vertices: &'a [[f32; 2]]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &'a [[f32; 2]] {
        self.vertices
    }

    /// Closest point on any segment of the path. Returns `None` for an empty
    /// path; a single vertex path projects everything onto that vertex.
    ///
    /// The projection parameter is clamped to each segment, so points never
    /// extrapolate past segment ends. On exact ties the earlier segment wins.
    pub fn closest_point(&self, point: Vector2) -> Option<Projection> {
        match self.vertices {
            [] => None,
            [only] => {
                let vertex = Vector2::from(*only);
                Some(Projection {
                    point: vertex,
                    distance_squared: vertex.distance_squared(&point),
                    segment: 0,
                })
            }
            vertices => {
                let mut best: Option<Projection> = None;

                for (segment, pair) in vertices.windows(2).enumerate() {
                    let start = Vector2::from(pair[0]);
                    let end = Vector2::from(pair[1]);
                    let candidate = project_onto_segment(point, start, end);
                    let distance_squared = candidate.distance_squared(&point);

                    if best.map_or(true, |b| distance_squared < b.distance_squared) {
                        best = Some(Projection {
                            point: candidate,
                            distance_squared,
                            segment,
                        });
                    }
                }

                best
            }
        }
    }
}

fn project_onto_segment(point: Vector2, start: Vector2, end: Vector2) -> Vector2 {
    let segment = end.sub(&start);
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return start;
    }

    let t = (point.sub(&start).dot(&segment) / length_squared).clamp(0.0, 1.0);
    start.add(&segment.scale(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const L_SHAPE: [[f32; 2]; 3] = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];

    #[test]
    fn test_projection_prefers_first_segment_on_tie() {
        let path = TunnelPath::new(&L_SHAPE);
        let projection = path.closest_point(Vector2::new(5.0, 5.0)).unwrap();

        assert_eq!(projection.point, Vector2::new(5.0, 0.0));
        assert_eq!(projection.segment, 0);
        assert_approx_eq!(projection.distance(), 5.0, 1e-6);
    }

    #[test]
    fn test_projection_onto_second_segment() {
        let path = TunnelPath::new(&L_SHAPE);
        let projection = path.closest_point(Vector2::new(14.0, 7.0)).unwrap();

        assert_eq!(projection.point, Vector2::new(10.0, 7.0));
        assert_eq!(projection.segment, 1);
        assert_approx_eq!(projection.distance(), 4.0, 1e-6);
    }

    #[test]
    fn test_projection_clamps_to_segment_ends() {
        let path = TunnelPath::new(&L_SHAPE);

        let before_start = path.closest_point(Vector2::new(-5.0, -3.0)).unwrap();
        assert_eq!(before_start.point, Vector2::new(0.0, 0.0));

        let past_end = path.closest_point(Vector2::new(12.0, 25.0)).unwrap();
        assert_eq!(past_end.point, Vector2::new(10.0, 10.0));
    }

    #[test]
    fn test_point_on_path_projects_to_itself() {
        let path = TunnelPath::new(&L_SHAPE);
        let projection = path.closest_point(Vector2::new(10.0, 3.0)).unwrap();

        assert_eq!(projection.point, Vector2::new(10.0, 3.0));
        assert_eq!(projection.distance_squared, 0.0);
    }

    #[test]
    fn test_degenerate_paths() {
        assert!(TunnelPath::new(&[]).closest_point(Vector2::ZERO).is_none());

        let single = [[3.0, 4.0]];
        let projection = TunnelPath::new(&single)
            .closest_point(Vector2::ZERO)
            .unwrap();
        assert_eq!(projection.point, Vector2::new(3.0, 4.0));
        assert_eq!(projection.distance_squared, 25.0);

        let repeated = [[1.0, 1.0], [1.0, 1.0]];
        let projection = TunnelPath::new(&repeated)
            .closest_point(Vector2::new(1.0, 5.0))
            .unwrap();
        assert_eq!(projection.point, Vector2::new(1.0, 1.0));
    }
}
