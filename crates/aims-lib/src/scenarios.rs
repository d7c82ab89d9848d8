//! Reference operating scenarios used for demos and end-to-end checks

use crate::models::SensorReading;

/// Sensors at least one of which should drive a critical-fault diagnosis
pub const CRITICAL_FAULT_FEATURES: [&str; 7] = [
    "Vibration_X",
    "Vibration_Y",
    "Vibration_Z",
    "Cylinder1_Exhaust_Temp",
    "Cylinder2_Exhaust_Temp",
    "Cylinder3_Exhaust_Temp",
    "Cylinder4_Exhaust_Temp",
];

/// Known engine states with hand-picked sensor values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoScenario {
    /// Nominal readings across the board
    Normal,
    /// Elevated oil temperature with slightly low oil pressure
    MinorFault,
    /// Low charge air pressure, heavy vibration and hot exhaust
    CriticalFault,
}

impl DemoScenario {
    pub const ALL: [DemoScenario; 3] = [
        DemoScenario::Normal,
        DemoScenario::MinorFault,
        DemoScenario::CriticalFault,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DemoScenario::Normal => "normal",
            DemoScenario::MinorFault => "minor-fault",
            DemoScenario::CriticalFault => "critical-fault",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            DemoScenario::Normal => "Normal Operation",
            DemoScenario::MinorFault => "Minor Fault (Lubrication Oil Degradation)",
            DemoScenario::CriticalFault => "Critical Fault (Turbocharger + Vibration)",
        }
    }

    pub fn reading(&self) -> SensorReading {
        let nominal = nominal_reading();
        match self {
            DemoScenario::Normal => nominal,
            DemoScenario::MinorFault => SensorReading {
                Oil_Temp: 95.0,
                Oil_Pressure: 2.8,
                Vibration_X: 0.06,
                Vibration_Y: 0.06,
                Vibration_Z: 0.06,
                ..nominal
            },
            DemoScenario::CriticalFault => SensorReading {
                Air_Pressure: 1.8,
                Vibration_X: 0.25,
                Vibration_Y: 0.22,
                Vibration_Z: 0.20,
                Cylinder1_Pressure: 130.0,
                Cylinder1_Exhaust_Temp: 480.0,
                Cylinder2_Pressure: 130.0,
                Cylinder2_Exhaust_Temp: 480.0,
                Cylinder3_Pressure: 130.0,
                Cylinder3_Exhaust_Temp: 480.0,
                Cylinder4_Pressure: 130.0,
                Cylinder4_Exhaust_Temp: 480.0,
                ..nominal
            },
        }
    }
}

fn nominal_reading() -> SensorReading {
    SensorReading {
        Shaft_RPM: 950.0,
        Engine_Load: 70.0,
        Fuel_Flow: 120.0,
        Air_Pressure: 2.5,
        Ambient_Temp: 25.0,
        Oil_Temp: 75.0,
        Oil_Pressure: 3.5,
        Vibration_X: 0.05,
        Vibration_Y: 0.05,
        Vibration_Z: 0.05,
        Cylinder1_Pressure: 145.0,
        Cylinder1_Exhaust_Temp: 420.0,
        Cylinder2_Pressure: 145.0,
        Cylinder2_Exhaust_Temp: 420.0,
        Cylinder3_Pressure: 145.0,
        Cylinder3_Exhaust_Temp: 420.0,
        Cylinder4_Pressure: 145.0,
        Cylinder4_Exhaust_Temp: 420.0,
    }
}
