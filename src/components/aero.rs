use nalgebra::{Matrix3, Vector3};

use super::motion::Motion;
use super::vehicle::Vehicle;
use crate::atmosphere;
use crate::functions::Function;
use crate::properties::{PropertyId, PropertyStore};

/// Below this airspeed the closed-form alpha/beta rates blow up on the
/// vanishing denominator, so both are forced to zero.
const MIN_SPEED_FOR_RATES: f32 = 1e-3;

/// Per-tick aerodynamic state: flow angles and rates, dynamic pressure,
/// Mach and Reynolds numbers, rate-normalization factors and the
/// ground-effect pair. Reads host kinematics, writes properties consumed by
/// the function graph.
#[derive(Debug)]
pub struct Aero {
    /// Body-relative airflow velocity, m/s. Written by the host.
    pub vel: Vector3<f32>,
    /// Optional body-frame time derivative of `vel`; enables closed-form
    /// alpha/beta rates instead of finite differencing.
    pub vel_dot: Option<Vector3<f32>>,
    /// Previous-tick aerodynamic force in body frame, used for the lift
    /// coefficient feedback property.
    pub force: Vector3<f32>,

    pub alpha: PropertyId,
    pub beta: PropertyId,
    pub alpha_dot: PropertyId,
    pub beta_dot: PropertyId,
    pub bi2vel: PropertyId,
    pub ci2vel: PropertyId,
    pub k_clge: PropertyId,
    pub hb_mac: PropertyId,
    pub rho: PropertyId,
    pub pressure: PropertyId,
    pub temperature: PropertyId,
    pub qbar: PropertyId,
    pub cl_square: PropertyId,
    pub mach: PropertyId,
    pub reynolds: PropertyId,
}

impl Aero {
    pub fn new(props: &mut PropertyStore) -> Self {
        Aero {
            vel: Vector3::zeros(),
            vel_dot: None,
            force: Vector3::zeros(),
            alpha: props.get_or_create("aero/alpha-1?"),
            beta: props.get_or_create("aero/beta-1?"),
            alpha_dot: props.get_or_create("aero/alphadot-1?"),
            beta_dot: props.get_or_create("aero/betadot-1?"),
            bi2vel: props.get_or_create("aero/bi2vel-1?"),
            ci2vel: props.get_or_create("aero/ci2vel-1?"),
            k_clge: props.get_or_create("aero/function/kCLge-1?"),
            hb_mac: props.get_or_create("aero/h_b-mac-1?"),
            rho: props.get_or_create("atmosphere/rho-1?"),
            pressure: props.get_or_create("atmosphere/pressure-1?"),
            temperature: props.get_or_create("atmosphere/T-1?"),
            qbar: props.get_or_create("aero/qbar-1?"),
            cl_square: props.get_or_create("aero/cl-squared-1?"),
            mach: props.get_or_create("velocities/mach-1?"),
            reynolds: props.get_or_create("aero/Re-1?"),
        }
    }

    /// Indicated airspeed, from dynamic pressure against sea-level density.
    pub fn ias(&self, props: &PropertyStore) -> f32 {
        (2.0 * props.value(self.qbar) / atmosphere::density_at(0.0)).sqrt()
    }

    /// Previous-tick force rotated into the wind frame, with the drag/side/
    /// lift sign convention applied.
    pub fn force_wind(&self, alpha: f32, beta: f32) -> Vector3<f32> {
        let (sa, ca) = alpha.sin_cos();
        let (sb, cb) = beta.sin_cos();
        let body_to_wind = Matrix3::new(
            ca * cb, -ca * sb, -sa, //
            sb, cb, 0.0, //
            sa * cb, -sa * sb, ca,
        )
        .transpose();
        let f = body_to_wind * self.force;
        Vector3::new(-f.x, f.y, -f.z)
    }

    pub fn update_property(
        &self,
        props: &mut PropertyStore,
        vehicle: &Vehicle,
        motion: &Motion,
        fn_k_clge: Option<&Function>,
        delta_t: f32,
    ) {
        let vel = self.vel;
        let speed = vel.norm();
        let two_vel = if speed == 0.0 { 1.0 } else { 2.0 * speed };
        let delta_t = if delta_t == 0.0 { 1.0 } else { delta_t };
        let (u, v, w) = (vel.x, vel.y, vel.z);

        let alpha0 = w.atan2(u);
        let beta0 = v.atan2((u * u + w * w).sqrt());
        let (alpha_dot, beta_dot) = match self.vel_dot {
            Some(vd) if speed >= MIN_SPEED_FOR_RATES => {
                // quotient-rule derivatives of the atan2 flow angles
                let uw2 = u * u + w * w;
                let s = uw2.sqrt();
                let s_dot = if s > 0.0 { (u * vd.x + w * vd.z) / s } else { 0.0 };
                (
                    (u * vd.z - w * vd.x) / uw2,
                    (s * vd.y - v * s_dot) / (s * s + v * v),
                )
            }
            Some(_) => (0.0, 0.0),
            None => (
                (alpha0 - props.value(self.alpha)) / delta_t,
                (beta0 - props.value(self.beta)) / delta_t,
            ),
        };

        props.set_value(self.alpha, alpha0);
        props.set_value(self.beta, beta0);
        props.set_value(self.alpha_dot, alpha_dot);
        props.set_value(self.beta_dot, beta_dot);

        let span = props.value(vehicle.wing_span);
        let chord = props.value(vehicle.wing_chord);
        props.set_value(self.bi2vel, span / two_vel);
        props.set_value(self.ci2vel, chord / two_vel);

        let alt = props.value(motion.alt);
        let (pressure, temperature) = atmosphere::pressure_temperature(alt);
        let rho = atmosphere::density(pressure, temperature);
        let qbar = rho * vel.norm_squared() / 2.0;
        props.set_value(self.pressure, pressure);
        props.set_value(self.temperature, temperature);
        props.set_value(self.rho, rho);
        props.set_value(self.qbar, qbar);

        if qbar > 1.0 {
            let wing_area = props.value(vehicle.wing_area);
            let cl = self.force_wind(alpha0, beta0).z / (wing_area * qbar);
            props.set_value(self.cl_square, cl);
        }

        props.set_value(self.mach, speed / atmosphere::sound_speed(temperature));
        let kinematic_viscosity = atmosphere::viscosity(temperature) / rho;
        props.set_value(self.reynolds, speed * chord / kinematic_viscosity);

        let agl = alt - props.value(motion.terrain_alt);
        props.set_value(self.hb_mac, agl / chord);
        // evaluated after its height-ratio input is published
        let k_clge = fn_k_clge.map_or(0.0, |f| f.eval(props));
        props.set_value(self.k_clge, k_clge);
    }
}
