//! Rigid bodies
//!
//! [`RigidBody`] describes a body before it is created in a [`Space`]. Once
//! created, the body lives in rapier's body set and is reached through the
//! [`Body`] and [`BodyMut`] views, which speak [`Vec2`].
//!
//! Impulses change velocity immediately using the mass and moment given at
//! creation, so they take effect even before the first step. Forces
//! accumulate on the rapier body and are consumed by the next step.
//!
//! [`Space`]: super::Space

use crate::foundation::math::{cross, cross_scalar, rotate, Vec2};
use rapier2d::dynamics::{MassProperties, RigidBodyBuilder};
use rapier2d::math::{Isometry, Point, Vector};

type Simulated = rapier2d::dynamics::RigidBody;

pub(crate) fn to_vector(v: Vec2) -> Vector<f32> {
    Vector::new(v.x, v.y)
}

pub(crate) fn from_vector(v: &Vector<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Moment of inertia for a hollow circle with inner radius `inner` and outer
/// radius `outer` (use `inner = 0` for a solid disc)
pub fn moment_for_circle(mass: f32, inner: f32, outer: f32) -> f32 {
    mass * (inner * inner + outer * outer) / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Inertia {
    mass: f32,
    moment: f32,
}

impl Inertia {
    fn inverse_mass(self) -> f32 {
        if self.mass.is_finite() && self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    fn inverse_moment(self) -> f32 {
        if self.moment.is_finite() && self.moment > 0.0 {
            1.0 / self.moment
        } else {
            0.0
        }
    }

    /// Linear and angular velocity change for `impulse` applied `offset` away
    /// from the centre of gravity
    fn velocity_change(self, offset: Vec2, impulse: Vec2) -> (Vec2, f32) {
        (
            impulse * self.inverse_mass(),
            cross(offset, impulse) * self.inverse_moment(),
        )
    }
}

/// Description of a body to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    inertia: Inertia,
    position: Vec2,
    angle: f32,
    velocity: Vec2,
    angular_velocity: f32,
}

impl RigidBody {
    /// Creates a body at rest at `position`
    pub fn new(mass: f32, moment: f32, position: Vec2) -> Self {
        Self {
            inertia: Inertia { mass, moment },
            position,
            angle: 0.0,
            velocity: Vec2::zeros(),
            angular_velocity: 0.0,
        }
    }

    /// Sets the initial orientation (builder style)
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Body mass
    pub fn mass(&self) -> f32 {
        self.inertia.mass
    }

    /// Moment of inertia
    pub fn moment(&self) -> f32 {
        self.inertia.moment
    }

    /// Initial position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Initial orientation in radians, counter-clockwise
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Initial linear velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Initial angular velocity
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Applies a world-space impulse at a world-space point
    pub fn apply_impulse_at_world_point(&mut self, impulse: Vec2, point: Vec2) {
        let (linear, angular) = self.inertia.velocity_change(point - self.position, impulse);
        self.velocity += linear;
        self.angular_velocity += angular;
    }

    /// Applies a body-local impulse at a body-local point
    pub fn apply_impulse_at_local_point(&mut self, impulse: Vec2, point: Vec2) {
        let world_point = self.position + rotate(point, self.angle);
        self.apply_impulse_at_world_point(rotate(impulse, self.angle), world_point);
    }

    pub(crate) fn inertia(&self) -> Inertia {
        self.inertia
    }

    /// Disabled rapier body; [`Space::add`](super::Space::add) enables it
    pub(crate) fn build(&self) -> Simulated {
        RigidBodyBuilder::dynamic()
            .position(Isometry::new(to_vector(self.position), self.angle))
            .linvel(to_vector(self.velocity))
            .angvel(self.angular_velocity)
            .additional_mass_properties(MassProperties::new(
                Point::origin(),
                self.inertia.mass,
                self.inertia.moment,
            ))
            .can_sleep(false)
            .enabled(false)
            .build()
    }
}

/// Read access to a body in a [`Space`](super::Space)
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    state: &'a Simulated,
    inertia: Inertia,
}

impl<'a> Body<'a> {
    pub(crate) fn new(state: &'a Simulated, inertia: Inertia) -> Self {
        Self { state, inertia }
    }

    /// Body mass
    pub fn mass(&self) -> f32 {
        self.inertia.mass
    }

    /// Moment of inertia
    pub fn moment(&self) -> f32 {
        self.inertia.moment
    }

    /// Whether the body takes part in the simulation
    pub fn is_attached(&self) -> bool {
        self.state.is_enabled()
    }

    /// World-space position of the centre of gravity
    pub fn position(&self) -> Vec2 {
        from_vector(self.state.translation())
    }

    /// Orientation in radians, counter-clockwise
    pub fn angle(&self) -> f32 {
        self.state.rotation().angle()
    }

    /// Linear velocity
    pub fn velocity(&self) -> Vec2 {
        from_vector(self.state.linvel())
    }

    /// Angular velocity in radians per second
    pub fn angular_velocity(&self) -> f32 {
        self.state.angvel()
    }

    /// Converts a body-local point to world space
    pub fn local_to_world(&self, point: Vec2) -> Vec2 {
        self.position() + rotate(point, self.angle())
    }

    /// Velocity of a world-space point rigidly attached to the body
    pub fn velocity_at_world_point(&self, point: Vec2) -> Vec2 {
        self.velocity() + cross_scalar(self.angular_velocity(), point - self.position())
    }
}

/// Write access to a body in a [`Space`](super::Space)
#[derive(Debug)]
pub struct BodyMut<'a> {
    state: &'a mut Simulated,
    inertia: Inertia,
}

impl<'a> BodyMut<'a> {
    pub(crate) fn new(state: &'a mut Simulated, inertia: Inertia) -> Self {
        Self { state, inertia }
    }

    /// Read-only view of the same body
    pub fn view(&self) -> Body<'_> {
        Body::new(self.state, self.inertia)
    }

    /// World-space position of the centre of gravity
    pub fn position(&self) -> Vec2 {
        self.view().position()
    }

    /// Orientation in radians
    pub fn angle(&self) -> f32 {
        self.view().angle()
    }

    /// Linear velocity
    pub fn velocity(&self) -> Vec2 {
        self.view().velocity()
    }

    /// Angular velocity in radians per second
    pub fn angular_velocity(&self) -> f32 {
        self.view().angular_velocity()
    }

    /// Teleports the body
    pub fn set_position(&mut self, position: Vec2) {
        let angle = self.angle();
        self.state
            .set_position(Isometry::new(to_vector(position), angle), true);
    }

    /// Sets the orientation in radians
    pub fn set_angle(&mut self, angle: f32) {
        let position = self.position();
        self.state
            .set_position(Isometry::new(to_vector(position), angle), true);
    }

    /// Sets the linear velocity
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.state.set_linvel(to_vector(velocity), true);
    }

    /// Sets the angular velocity
    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.state.set_angvel(angular_velocity, true);
    }

    /// Applies a world-space impulse at a world-space point
    pub fn apply_impulse_at_world_point(&mut self, impulse: Vec2, point: Vec2) {
        let (linear, angular) = self.inertia.velocity_change(point - self.position(), impulse);
        let velocity = self.velocity() + linear;
        let angular_velocity = self.angular_velocity() + angular;
        self.set_velocity(velocity);
        self.set_angular_velocity(angular_velocity);
    }

    /// Applies a body-local impulse at a body-local point
    pub fn apply_impulse_at_local_point(&mut self, impulse: Vec2, point: Vec2) {
        let angle = self.angle();
        let world_point = self.view().local_to_world(point);
        self.apply_impulse_at_world_point(rotate(impulse, angle), world_point);
    }

    /// Accumulates a world-space force at a world-space point until the next step
    pub fn apply_force_at_world_point(&mut self, force: Vec2, point: Vec2) {
        self.state
            .add_force_at_point(to_vector(force), Point::new(point.x, point.y), true);
    }

    /// Accumulates a body-local force at a body-local point until the next step
    pub fn apply_force_at_local_point(&mut self, force: Vec2, point: Vec2) {
        let angle = self.angle();
        let world_point = self.view().local_to_world(point);
        self.apply_force_at_world_point(rotate(force, angle), world_point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn disc() -> RigidBody {
        RigidBody::new(10.0, moment_for_circle(10.0, 0.0, 30.0), Vec2::new(5.0, 5.0))
    }

    #[test]
    fn test_moment_for_solid_disc() {
        assert_relative_eq!(moment_for_circle(2.0, 0.0, 3.0), 9.0);
    }

    #[test]
    fn test_central_impulse_only_changes_linear_velocity() {
        let mut body = disc();
        body.apply_impulse_at_local_point(Vec2::new(0.0, 20.0), Vec2::zeros());

        assert_relative_eq!(body.velocity().y, 2.0);
        assert_relative_eq!(body.angular_velocity(), 0.0);
    }

    #[test]
    fn test_local_impulse_follows_orientation() {
        let mut body = disc().with_angle(FRAC_PI_2);
        body.apply_impulse_at_local_point(Vec2::new(0.0, 10.0), Vec2::zeros());

        // local +y rotated a quarter turn points along world -x
        assert_relative_eq!(body.velocity().x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(body.velocity().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_off_center_impulse_spins_counter_clockwise() {
        let mut body = disc();
        body.apply_impulse_at_local_point(Vec2::new(0.0, 1.0), Vec2::new(150.0, 0.0));
        assert!(body.angular_velocity() > 0.0);

        let mut body = disc();
        body.apply_impulse_at_local_point(Vec2::new(0.0, 1.0), Vec2::new(-150.0, 0.0));
        assert!(body.angular_velocity() < 0.0);
    }

    #[test]
    fn test_built_body_starts_detached_with_launch_state() {
        let mut body = disc().with_angle(FRAC_PI_2);
        body.apply_impulse_at_world_point(Vec2::new(30.0, 0.0), body.position());
        let built = body.build();

        assert!(!built.is_enabled());
        assert_relative_eq!(built.linvel().x, 3.0);
        assert_relative_eq!(built.rotation().angle(), FRAC_PI_2, epsilon = 1e-6);
    }
}
