//! Column headers shared by raw exports and persisted curves.

pub const CYCLE_INDEX: &str = "Cycle_Index";
pub const TEST_TIME: &str = "Test_Time(s)";
pub const CURRENT: &str = "Current(A)";
pub const VOLTAGE: &str = "Voltage(V)";
pub const CHARGE_CAPACITY: &str = "Charge_Capacity(Ah)";
pub const DISCHARGE_CAPACITY: &str = "Discharge_Capacity(Ah)";
pub const INTERPOLATED_VOLTAGE: &str = "Interpolated Voltage (V)";
pub const SMOOTHED_VOLTAGE: &str = "Voltage_sm (V)";
pub const DQ_DV: &str = "dQ/dV (computed from preprocessed V) (Ah/V)";
pub const DV_DQ: &str = "dV/dQ (computed from preprocessed V) (V/Ah)";
