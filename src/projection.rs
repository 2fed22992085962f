use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Minimum ray component magnitude for a surface to be considered at all.
/// Compared against the component itself, not against an angle.
pub const RAY_EPSILON: f32 = 0.01;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    None,
    Front,
    Left,
    Right,
    Floor,
}

impl std::fmt::Display for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Wall::None => "None",
            Wall::Front => "Front",
            Wall::Left => "Left",
            Wall::Right => "Right",
            Wall::Floor => "Floor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub point: na::Point3<f32>,
    pub wall: Wall,
}

/// Virtual room around the user. The user stands at the origin, the floor
/// sits at `-height / 2` and the side walls at `±width / 2`. The front wall
/// distance is not part of the room, it follows the live configuration.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RoomGeometry {
    pub width: f32,
    pub height: f32,
}

impl Default for RoomGeometry {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 3.0,
        }
    }
}

impl RoomGeometry {
    /// Finds the surface struck by a ray leaving the origin along `dir`.
    ///
    /// The front wall wins whenever it is hit inside the room bounds. Otherwise
    /// the side wall picked by the sign of `dir.x` is taken, unless the floor is
    /// struck earlier along the ray. Returns `None` when no surface is reachable.
    pub fn project(&self, dir: &na::Vector3<f32>, distance: f32) -> Option<HitResult> {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;

        if dir.z > RAY_EPSILON {
            let t = distance / dir.z;
            let x = dir.x * t;
            let y = dir.y * t;
            if x.abs() <= half_width && y.abs() <= half_height {
                return Some(HitResult {
                    point: na::Point3::new(x, y, distance),
                    wall: Wall::Front,
                });
            }
        }

        let side = if dir.x.abs() > RAY_EPSILON {
            let (wall_x, wall) = if dir.x > 0.0 {
                (half_width, Wall::Right)
            } else {
                (-half_width, Wall::Left)
            };
            let t_side = wall_x / dir.x;
            Some((
                t_side,
                HitResult {
                    point: na::Point3::new(wall_x, dir.y * t_side, dir.z * t_side),
                    wall,
                },
            ))
        } else {
            None
        };

        let floor = if dir.y < -RAY_EPSILON {
            let floor_y = -half_height;
            let t_floor = floor_y / dir.y;
            Some((
                t_floor,
                HitResult {
                    point: na::Point3::new(dir.x * t_floor, floor_y, dir.z * t_floor),
                    wall: Wall::Floor,
                },
            ))
        } else {
            None
        };

        match (side, floor) {
            (Some((t_side, side)), Some((t_floor, floor))) => {
                if t_floor < t_side {
                    Some(floor)
                } else {
                    Some(side)
                }
            }
            (Some((_, side)), None) => Some(side),
            (None, Some((_, floor))) => Some(floor),
            (None, None) => None,
        }
    }
}
