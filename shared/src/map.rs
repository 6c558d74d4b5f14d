//! Static playfield data: tunnels, their portals and underground geometry.
//!
//! The map is loaded once at startup and never mutated at runtime. Its JSON
//! form is the map-definition document served to clients:
//! `{ "tunnels": [ { "color", "portals": [{x, y}], "geometry": [[x, y]] } ] }`.

use crate::geometry::TunnelPath;
use crate::position::Position;
use crate::PORTAL_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Boxes without area never overlap anything.
    pub fn overlaps_with(&self, other: &Hitbox) -> bool {
        if self.w <= 0.0 || self.h <= 0.0 || other.w <= 0.0 || other.h <= 0.0 {
            return false;
        }

        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

/// A colored underground passage. The color doubles as the wire identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tunnel {
    pub color: String,
    pub portals: Vec<Point>,
    pub geometry: Vec<[f32; 2]>,
}

impl Tunnel {
    pub fn path(&self) -> TunnelPath<'_> {
        TunnelPath::new(&self.geometry)
    }

    pub fn portal_hitboxes(&self) -> impl Iterator<Item = Hitbox> + '_ {
        self.portals
            .iter()
            .map(|portal| Hitbox::new(portal.x, portal.y, PORTAL_SIZE, PORTAL_SIZE))
    }

    /// Clamps a position onto the tunnel walls. Tunnels without geometry
    /// leave the position unchanged.
    pub fn clamp(&self, position: Position) -> Position {
        self.path()
            .closest_point(position.vector())
            .map(|projection| Position::from(projection.point))
            .unwrap_or(position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldMap {
    pub tunnels: Vec<Tunnel>,
}

impl PlayfieldMap {
    pub fn tunnel(&self, color: &str) -> Option<&Tunnel> {
        self.tunnels.iter().find(|tunnel| tunnel.color == color)
    }

    /// First tunnel that has a portal overlapping `hitbox`.
    pub fn portal_at(&self, hitbox: &Hitbox) -> Option<&Tunnel> {
        self.tunnels.iter().find(|tunnel| {
            tunnel
                .portal_hitboxes()
                .any(|portal| portal.overlaps_with(hitbox))
        })
    }

    pub fn colors(&self) -> impl Iterator<Item = &str> {
        self.tunnels.iter().map(|tunnel| tunnel.color.as_str())
    }
}

fn tunnel(color: &str, portals: &[(f32, f32)], geometry: &[[f32; 2]]) -> Tunnel {
    Tunnel {
        color: color.to_string(),
        portals: portals.iter().map(|&(x, y)| Point { x, y }).collect(),
        geometry: geometry.to_vec(),
    }
}

impl Default for PlayfieldMap {
    fn default() -> Self {
        Self {
            tunnels: vec![
                tunnel(
                    "green",
                    &[(60.0, 60.0), (100.0, 100.0)],
                    &[[70.0, 70.0], [70.0, 110.0], [110.0, 110.0]],
                ),
                tunnel(
                    "red",
                    &[(20.0, 20.0), (280.0, 20.0), (280.0, 140.0)],
                    &[[30.0, 30.0], [290.0, 30.0], [290.0, 150.0]],
                ),
                tunnel(
                    "blue",
                    &[(120.0, 50.0), (220.0, 50.0), (170.0, 90.0)],
                    &[
                        [130.0, 60.0],
                        [180.0, 60.0],
                        [180.0, 100.0],
                        [230.0, 100.0],
                        [230.0, 60.0],
                    ],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitbox_overlap() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);

        assert!(a.overlaps_with(&Hitbox::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.overlaps_with(&Hitbox::new(-5.0, 2.0, 6.0, 2.0)));
        assert!(!a.overlaps_with(&Hitbox::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps_with(&Hitbox::new(0.0, 20.0, 5.0, 5.0)));
        assert!(!a.overlaps_with(&Hitbox::new(2.0, 2.0, 0.0, 5.0)));
    }

    #[test]
    fn test_hitbox_move() {
        let mut hitbox = Hitbox::new(1.0, 2.0, 3.0, 4.0);
        hitbox.move_by(1.5, -2.0);
        assert_eq!(hitbox, Hitbox::new(2.5, 0.0, 3.0, 4.0));
    }

    #[test]
    fn test_default_map_lookup() {
        let map = PlayfieldMap::default();

        assert_eq!(map.colors().collect::<Vec<_>>(), vec!["green", "red", "blue"]);
        assert_eq!(map.tunnel("red").unwrap().portals.len(), 3);
        assert!(map.tunnel("purple").is_none());
    }

    #[test]
    fn test_portal_detection() {
        let map = PlayfieldMap::default();

        let at_red_portal = Hitbox::new(275.0, 135.0, 13.0, 13.0);
        assert_eq!(map.portal_at(&at_red_portal).unwrap().color, "red");

        let in_the_open = Hitbox::new(200.0, 150.0, 13.0, 13.0);
        assert!(map.portal_at(&in_the_open).is_none());
    }

    #[test]
    fn test_tunnel_clamp() {
        let map = PlayfieldMap::default();
        let red = map.tunnel("red").unwrap();

        let clamped = red.clamp(Position::new(100.0, 41.0));
        assert_eq!(clamped, Position::new(100.0, 30.0));
    }

    #[test]
    fn test_map_json_shape() {
        let json = serde_json::to_value(PlayfieldMap::default()).unwrap();
        let green = &json["tunnels"][0];

        assert_eq!(green["color"], "green");
        assert_eq!(green["portals"][0]["x"], 60.0);
        assert_eq!(green["geometry"][2][0], 110.0);

        let parsed: PlayfieldMap = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, PlayfieldMap::default());
    }
}
