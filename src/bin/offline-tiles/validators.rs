use offline_tiles::{Preset, TileSource, MAX_ZOOM};

pub fn is_numeric_min(min: usize) -> impl Fn(&str) -> Result<usize, String> + Clone {
    move |v: &str| {
        let val = v
            .parse::<usize>()
            .map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        }

        Ok(val)
    }
}

pub fn is_zoom(v: &str) -> Result<u8, String> {
    let val = v.parse::<u8>().map_err(|_| "must be numeric".to_owned())?;

    if val > MAX_ZOOM {
        return Err(format!("must be <= {}", MAX_ZOOM));
    }

    Ok(val)
}

pub fn is_latitude(v: &str) -> Result<f64, String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if !(-90f64..=90f64).contains(&val) {
        return Err("must be within [-90°, 90°]".to_owned());
    }

    Ok(val)
}

pub fn is_longitude(v: &str) -> Result<f64, String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val < -180f64 {
        return Err("must be >= -180°".to_owned());
    } else if val > 180f64 {
        return Err("must be <= 180°".to_owned());
    }

    Ok(val)
}

pub fn is_preset(v: &str) -> Result<Preset, String> {
    v.parse::<Preset>().map_err(|_| {
        "invalid preset (expected altai, altai-large, crimea or baikal)".to_owned()
    })
}

/// A source name, or `all` for every source.
pub fn is_sources(v: &str) -> Result<Vec<TileSource>, String> {
    if v.eq_ignore_ascii_case("all") {
        return Ok(TileSource::ALL.to_vec());
    }

    v.parse::<TileSource>()
        .map(|source| vec![source])
        .map_err(|e| e.to_string())
}
