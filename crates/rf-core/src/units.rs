// rf-core/src/units.rs
//
// Internal field units: pressure in bar, rates in Sm3/day, time in days.
// Pipe geometry and fluid properties travel as typed SI quantities.

use uom::si::f64::{
    Acceleration as UomAcceleration, Area as UomArea, DynamicViscosity as UomDynamicViscosity,
    Length as UomLength, MassDensity as UomMassDensity, Pressure as UomPressure,
    Velocity as UomVelocity, VolumeRate as UomVolumeRate,
};

pub type Accel = UomAcceleration;
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type DynVisc = UomDynamicViscosity;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

/// Pressure units accepted on input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PressureUnit {
    #[default]
    Bar,
    Psi,
    Kpa,
}

impl PressureUnit {
    /// Build a typed pressure from a raw value in this unit.
    pub fn quantity(self, v: f64) -> Pressure {
        use uom::si::pressure::{kilopascal, pound_force_per_square_inch};
        match self {
            PressureUnit::Bar => bar(v),
            PressureUnit::Psi => Pressure::new::<pound_force_per_square_inch>(v),
            PressureUnit::Kpa => Pressure::new::<kilopascal>(v),
        }
    }

    /// Convert a raw value in this unit to bar.
    pub fn to_bar(self, v: f64) -> f64 {
        as_bar(self.quantity(v))
    }
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn as_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn pa_s(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::pascal_second;
    DynVisc::new::<pascal_second>(v)
}

/// Standard gravity.
#[inline]
pub fn g0() -> Accel {
    use uom::si::acceleration::meter_per_second_squared;
    Accel::new::<meter_per_second_squared>(9.806_65)
}

/// Standard cubic metres per day.
#[inline]
pub fn sm3_per_day(v: f64) -> VolumeRate {
    use uom::si::time::day;
    use uom::si::volume::cubic_meter;
    uom::si::f64::Volume::new::<cubic_meter>(v) / uom::si::f64::Time::new::<day>(1.0)
}
