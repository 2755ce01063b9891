mod impls;

/// Materializes the bounds of every classified loop value in the loop's
/// preheader, together with the taken test when the bounds need one.
#[derive(Default)]
pub struct RangeHoisting {}
