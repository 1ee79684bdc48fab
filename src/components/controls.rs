use crate::properties::{PropertyId, PropertyStore};

/// Control-surface positions exposed to the function graph. The host writes
/// the primary surfaces each tick through [`FlightControlSys::set`]; the
/// secondary surfaces (flaperon mix, leading-edge flap, speedbrake, gear) are
/// seeded at zero and driven by whatever system functions the document binds
/// to them.
#[derive(Debug)]
pub struct FlightControlSys {
    pub left_aileron: PropertyId,
    pub right_aileron: PropertyId,
    pub elevator: PropertyId,
    pub rudder: PropertyId,
    pub lef: PropertyId,
    pub flaperon_mix: PropertyId,
    pub speedbrake: PropertyId,
    pub gear: PropertyId,
}

impl FlightControlSys {
    pub fn new(props: &mut PropertyStore) -> Self {
        FlightControlSys {
            left_aileron: props.get_or_create("fcs/left-aileron-pos-1?"),
            right_aileron: props.get_or_create("fcs/right-aileron-pos-1?"),
            elevator: props.get_or_create("fcs/elevator-pos-1?"),
            rudder: props.get_or_create("fcs/rudder-pos-1?"),
            lef: props.get_or_create("fcs/lef-pos-1?"),
            flaperon_mix: props.get_or_create("fcs/flaperon-mix-1?"),
            speedbrake: props.get_or_create("fcs/speedbrake-pos-1?"),
            gear: props.get_or_create("gear/gear-pos-1?"),
        }
    }

    /// Publish the primary surface deflections, radians.
    pub fn set(
        &self,
        props: &mut PropertyStore,
        aileron_left: f32,
        aileron_right: f32,
        elevator: f32,
        rudder: f32,
    ) {
        props.set_value(self.left_aileron, aileron_left);
        props.set_value(self.right_aileron, aileron_right);
        props.set_value(self.elevator, elevator);
        props.set_value(self.rudder, rudder);
    }
}
