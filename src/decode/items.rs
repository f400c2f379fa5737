//! Field mappings for the record layouts used with
//! [`parse_find_result`](super::parse_find_result).

use super::{field, int_field};
use crate::decode::DecodeError;
use crate::model::FindItem;
use crate::wire::{Point, Rect};

/// `label,score,x,y,width,height` as returned by the Yolo detection
/// procedures.
pub fn yolo_detection(fields: &[&str]) -> Result<FindItem, DecodeError> {
    let rect = Rect::checked_new(
        int_field(fields, 2)?,
        int_field(fields, 3)?,
        int_field(fields, 4)?,
        int_field(fields, 5)?,
    )
    .ok_or_else(|| DecodeError::OutOfRange {
        input: fields.join(","),
    })?;
    Ok(FindItem::detection(
        field(fields, 0)?,
        int_field(fields, 1)?,
        rect,
    ))
}

/// `index,x,y`.
pub fn indexed_point(fields: &[&str]) -> Result<FindItem, DecodeError> {
    Ok(FindItem::indexed_point(
        int_field(fields, 0)?,
        Point::new(int_field(fields, 1)?, int_field(fields, 2)?),
    ))
}

/// `index,name,x,y`.
pub fn indexed_named_point(fields: &[&str]) -> Result<FindItem, DecodeError> {
    Ok(FindItem::named_point(
        int_field(fields, 0)?,
        field(fields, 1)?,
        Point::new(int_field(fields, 2)?, int_field(fields, 3)?),
    ))
}
