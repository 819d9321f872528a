use crate::filters::{Filter, unknown_attribute};
use crate::foundation::core::{A, B, G, IntRect, R};
use crate::foundation::error::FxResult;
use crate::graph::attr::AttributeValue;
use crate::graph::eval::NodeCx;
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::EdgeMode;

/// Which transfer function family a node applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransferKind {
    Table,
    Discrete,
    Linear,
    Gamma,
}

#[derive(Clone, Debug)]
struct ChannelTransfer {
    disabled: bool,
    table: Vec<f32>,
    slope: f32,
    intercept: f32,
    amplitude: f32,
    exponent: f32,
    offset: f32,
}

impl Default for ChannelTransfer {
    fn default() -> Self {
        Self {
            disabled: true,
            table: Vec::new(),
            slope: 1.0,
            intercept: 0.0,
            amplitude: 1.0,
            exponent: 1.0,
            offset: 0.0,
        }
    }
}

/// Channel suffixes in attribute names, mapped to byte offsets.
const CHANNELS: [(&str, usize); 4] = [("r", R), ("g", G), ("b", B), ("a", A)];

#[derive(Clone, Debug)]
pub(crate) struct TransferFilter {
    kind: TransferKind,
    /// Indexed like [`CHANNELS`].
    channels: [ChannelTransfer; 4],
}

impl TransferFilter {
    pub(crate) fn new(kind: TransferKind) -> Self {
        Self {
            kind,
            channels: Default::default(),
        }
    }

    fn alpha_enabled(&self) -> bool {
        !self.channels[3].disabled
    }

    /// One 256-entry table per byte offset; disabled channels map to identity.
    pub(crate) fn lookup_tables(&self) -> [[u8; 256]; 4] {
        let mut tables = [identity_table(); 4];
        for (ch, (_, off)) in self.channels.iter().zip(CHANNELS) {
            if !ch.disabled {
                tables[off] = build_table(self.kind, ch);
            }
        }
        tables
    }
}

fn identity_table() -> [u8; 256] {
    std::array::from_fn(|i| i as u8)
}

fn clamp_round(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

fn build_table(kind: TransferKind, ch: &ChannelTransfer) -> [u8; 256] {
    let mut t = identity_table();
    match kind {
        TransferKind::Table => {
            let n = ch.table.len();
            if n < 2 {
                return t;
            }
            for (i, slot) in t.iter_mut().enumerate() {
                let k = (i * (n - 1)) / 255;
                let v1 = ch.table[k];
                let v2 = ch.table[(k + 1).min(n - 1)];
                let frac = i as f32 / 255.0 - k as f32 / (n - 1) as f32;
                let v = 255.0 * (v1 + frac * (n - 1) as f32 * (v2 - v1));
                *slot = if v.is_nan() { 0 } else { v.clamp(0.0, 255.0) as u8 };
            }
        }
        TransferKind::Discrete => {
            let n = ch.table.len();
            if n < 1 {
                return t;
            }
            for (i, slot) in t.iter_mut().enumerate() {
                let k = ((i * n) / 255).min(n - 1);
                *slot = clamp_round(255.0 * f64::from(ch.table[k]));
            }
        }
        TransferKind::Linear => {
            for (i, slot) in t.iter_mut().enumerate() {
                *slot = clamp_round(
                    f64::from(ch.slope) * i as f64 + 255.0 * f64::from(ch.intercept),
                );
            }
        }
        TransferKind::Gamma => {
            for (i, slot) in t.iter_mut().enumerate() {
                let x = (i as f64 / 255.0).powf(f64::from(ch.exponent));
                *slot = clamp_round(
                    255.0 * (f64::from(ch.amplitude) * x + f64::from(ch.offset)),
                );
            }
        }
    }
    t
}

impl Filter for TransferFilter {
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> FxResult<()> {
        let Some((field, suffix)) = name.rsplit_once('_') else {
            return Err(unknown_attribute(name));
        };
        let Some(idx) = CHANNELS.iter().position(|(s, _)| *s == suffix) else {
            return Err(unknown_attribute(name));
        };
        let kind = self.kind;
        let ch = &mut self.channels[idx];
        match (kind, field) {
            (_, "disable") => ch.disabled = value.to_bool(name)?,
            (TransferKind::Table | TransferKind::Discrete, "table") => {
                ch.table = value.to_floats(name)?
            }
            (TransferKind::Linear, "slope") => ch.slope = value.to_f32(name)?,
            (TransferKind::Linear, "intercept") => ch.intercept = value.to_f32(name)?,
            (TransferKind::Gamma, "amplitude") => ch.amplitude = value.to_f32(name)?,
            (TransferKind::Gamma, "exponent") => ch.exponent = value.to_f32(name)?,
            (TransferKind::Gamma, "offset") => ch.offset = value.to_f32(name)?,
            _ => return Err(unknown_attribute(name)),
        }
        Ok(())
    }

    fn output_rect(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<IntRect> {
        if self.alpha_enabled() {
            return Ok(rect);
        }
        cx.input_rect(0, rect)
    }

    fn render(&self, cx: &NodeCx<'_, '_>, rect: IntRect) -> FxResult<Option<RasterBuffer>> {
        let input = cx.fetch_input(0, rect, EdgeMode::None, None)?;
        if self.channels.iter().all(|c| c.disabled) {
            return Ok(input);
        }
        let mut buf = match input {
            Some(buf) => buf,
            None if self.alpha_enabled() => RasterBuffer::with_size(rect.size())?,
            None => return Ok(None),
        };
        let tables = self.lookup_tables();
        for y in 0..buf.height() {
            for px in buf.row_mut(y).chunks_exact_mut(4) {
                for (c, table) in px.iter_mut().zip(&tables) {
                    *c = table[*c as usize];
                }
            }
        }
        Ok(Some(buf))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/transfer.rs"]
mod tests;
