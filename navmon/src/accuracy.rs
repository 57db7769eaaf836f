//! Accuracy class tables: GLONASS Ft, Galileo SISA, GPS/BeiDou URA.
//!
//! Every table comes as a `human_*` text form and a `num_*` value in meters,
//! where `None` means the code carries no accuracy figure.

const FT_HUMAN: [&str; 16] = [
    "100 cm", "200 cm", "250 cm", "400 cm", "500 cm", "7 m", "10 m", "12 m", "14 m", "16 m",
    "32 m", "64 m", "128 m", "256 m", "512 m", "NONE",
];

const FT_METERS: [f64; 15] = [
    1.0, 2.0, 2.5, 4.0, 5.0, 7.0, 10.0, 12.0, 14.0, 16.0, 32.0, 64.0, 128.0, 256.0, 512.0,
];

pub fn human_ft(ft: u8) -> &'static str {
    FT_HUMAN.get(usize::from(ft)).copied().unwrap_or("???")
}

/// `None` for 15 (no accuracy available) and for undefined codes.
pub fn num_ft(ft: u8) -> Option<f64> {
    FT_METERS.get(usize::from(ft)).copied()
}

fn sisa_cm(sisa: u8) -> Option<u32> {
    let s = u32::from(sisa);
    match sisa {
        0..=49 => Some(s),
        50..=74 => Some(50 + 2 * (s - 50)),
        75..=99 => Some(100 + 4 * (s - 75)),
        100..=124 => Some(200 + 16 * (s - 100)),
        _ => None,
    }
}

pub fn human_sisa(sisa: u8) -> String {
    match (sisa_cm(sisa), sisa) {
        (Some(cm), _) => format!("{} cm", cm),
        (None, 255) => "NO SISA AVAILABLE".to_string(),
        (None, _) => "SPARE".to_string(),
    }
}

pub fn num_sisa(sisa: u8) -> Option<f64> {
    sisa_cm(sisa).map(|cm| f64::from(cm) / 100.0)
}

pub fn human_ura(ura: u8) -> String {
    match ura {
        0..=5 => format!("{} cm", (100.0 * ura_low_meters(ura)) as u32),
        6..=14 => format!("{} m", 1u32 << (ura - 2)),
        _ => "NO URA AVAILABLE".to_string(),
    }
}

pub fn num_ura(ura: u8) -> Option<f64> {
    match ura {
        0..=5 => Some(ura_low_meters(ura)),
        6..=14 => Some(f64::from(1u32 << (ura - 2))),
        _ => None,
    }
}

fn ura_low_meters(ura: u8) -> f64 {
    2f64.powf(1.0 + f64::from(ura) / 2.0)
}
