use bitflags::bitflags;

bitflags! {
    /// Permanent equipment owned by a player.
    ///
    /// Flags are bought once and never expire. Their stat contributions live
    /// in [`GearBonuses`](crate::config::GearBonuses).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Gear: u16 {
        const SCOPE          = 1 << 0;
        const SILENCER       = 1 << 1;
        const LUCKY_CHARM    = 1 << 2;
        const SUNGLASSES     = 1 << 3;
        const MIRROR         = 1 << 4;
        const GREASE         = 1 << 5;
        const BRUSH          = 1 << 6;
        const AP_AMMO        = 1 << 7;
        const EXPLOSIVE_AMMO = 1 << 8;
    }
}
