//! Yolo object detection and model management.

use crate::decode::{items, parse_find_result};
use crate::gateway::{CallGateway, Dispatch};
use crate::memory::{self, MemoryBlock};
use crate::model::FindResult;
use crate::wire::{Rect, WireValue};
use crate::{Error, Result};

/// Plugin loading and Yolo object detection.
///
/// Detection results are records of `label,score,x,y,width,height`.
pub struct AiFunctions<'a, D> {
    gateway: &'a CallGateway<D>,
}

impl<'a, D: Dispatch> AiFunctions<'a, D> {
    pub fn new(gateway: &'a CallGateway<D>) -> Self {
        Self { gateway }
    }

    /// Load the AI plugin from `file`. Returns the object's status code.
    pub fn load_ai(&self, file: &str) -> Result<i32> {
        Ok(self.gateway.call_for_i32("LoadAi", &mut crate::args![file])?)
    }

    /// Load the AI plugin from an in-memory image.
    pub fn load_ai_memory(&self, module: &[u8]) -> Result<i32> {
        memory::stage(module, |block| {
            self.gateway
                .call_for_i32("LoadAiMemory", &mut crate::args![block])
                .map_err(Error::from)
        })
    }

    pub fn set_yolo_version(&self, version: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("AiYoloSetVersion", &mut crate::args![version])?)
    }

    /// Load a model file into slot `index`.
    pub fn set_yolo_model(&self, index: i32, file: &str, password: &str) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("AiYoloSetModel", &mut crate::args![index, file, password])?)
    }

    /// Load an in-memory model into slot `index`.
    pub fn set_yolo_model_memory(&self, index: i32, model: &[u8], password: &str) -> Result<()> {
        memory::stage(model, |block| {
            self.gateway
                .call_expect_1(
                    "AiYoloSetModelMemory",
                    &mut crate::args![index, block, password],
                )
                .map_err(Error::from)
        })
    }

    pub fn use_yolo_model(&self, index: i32) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("AiYoloUseModel", &mut crate::args![index])?)
    }

    pub fn free_yolo_model(&self, index: i32) -> Result<()> {
        Ok(self
            .gateway
            .call_expect_1("AiYoloFreeModel", &mut crate::args![index])?)
    }

    /// Detect objects inside `rect` with the current model.
    ///
    /// `prob` is the minimum confidence and `iou` the overlap threshold.
    pub fn detect_objects(&self, rect: Rect, prob: f32, iou: f32) -> Result<FindResult> {
        let result = self.raw_detections(rect, prob, iou)?;
        Ok(parse_find_result(result.as_str(), items::yolo_detection)?)
    }

    /// Detect objects and order them in reading order, treating boxes whose
    /// vertical distance is under `line_height` as one line.
    pub fn detect_objects_sorted(
        &self,
        rect: Rect,
        prob: f32,
        iou: f32,
        line_height: i32,
    ) -> Result<FindResult> {
        let result = self.raw_detections(rect, prob, iou)?;
        let sorted = self
            .gateway
            .call_for_string("AiYoloSortsObjects", &mut crate::args![result, line_height])?;
        Ok(parse_find_result(sorted.as_str(), items::yolo_detection)?)
    }

    /// Detect objects and save an annotated image to `file`.
    pub fn detect_objects_to_file(
        &self,
        rect: Rect,
        prob: f32,
        iou: f32,
        file: &str,
        draw_prob: bool,
    ) -> Result<()> {
        Ok(self.gateway.call_expect_1(
            "AiYoloDetectObjectsToFile",
            &mut crate::args![rect, prob, iou, file, draw_prob],
        )?)
    }

    /// Detect objects and render an annotated bitmap into memory owned by
    /// the automation object.
    pub fn detect_objects_to_bmp(
        &self,
        rect: Rect,
        prob: f32,
        iou: f32,
        draw_prob: bool,
    ) -> Result<MemoryBlock> {
        let mut args = crate::args![
            rect,
            prob,
            iou,
            WireValue::placeholder(),
            WireValue::placeholder(),
            draw_prob
        ];
        self.gateway
            .call_expect_1("AiYoloDetectObjectsToDataBmp", &mut args)?;
        Ok(args.get_memory_block(-3, -2)?)
    }

    fn raw_detections(&self, rect: Rect, prob: f32, iou: f32) -> Result<String> {
        Ok(self
            .gateway
            .call_for_string("AiYoloDetectObjects", &mut crate::args![rect, prob, iou])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::{answering, succeeding};
    use crate::gateway::CallGateway;
    use crate::model::FindItem;
    use crate::testing::{Call, MockDispatch};

    #[test]
    fn test_detect_objects() {
        let gw = answering(
            "AiYoloDetectObjects",
            WireValue::Str("car,88,10,20,30,40".to_string()),
        );
        let found = AiFunctions::new(&gw)
            .detect_objects(Rect::from_corners(0, 0, 800, 600), 0.5, 0.45)
            .unwrap();
        assert_eq!(
            found,
            FindResult::one(FindItem::detection("car", 88, Rect::new(10, 20, 30, 40)))
        );
        assert_eq!(
            gw.dispatch().calls(),
            vec![Call::with_args(
                "AiYoloDetectObjects",
                vec![
                    WireValue::Int(0),
                    WireValue::Int(0),
                    WireValue::Int(800),
                    WireValue::Int(600),
                    WireValue::Float(0.5),
                    WireValue::Float(0.45),
                ]
            )]
        );
    }

    #[test]
    fn test_detect_nothing() {
        let gw = answering("AiYoloDetectObjects", WireValue::Str(String::new()));
        let found = AiFunctions::new(&gw)
            .detect_objects(Rect::default(), 0.5, 0.45)
            .unwrap();
        assert!(!found.found);
    }

    #[test]
    fn test_detect_sorted_feeds_raw_result_back() {
        let gw = CallGateway::new(MockDispatch::new(|procedure, _| {
            Ok(WireValue::Str(match procedure {
                "AiYoloDetectObjects" => "b,70,50,0,5,5|a,90,0,0,5,5".to_string(),
                _ => "a,90,0,0,5,5|b,70,50,0,5,5".to_string(),
            }))
        }));
        let found = AiFunctions::new(&gw)
            .detect_objects_sorted(Rect::default(), 0.5, 0.45, 20)
            .unwrap();
        let labels: Vec<_> = found.items.iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(
            gw.dispatch().calls().last(),
            Some(&Call::with_args(
                "AiYoloSortsObjects",
                vec![
                    WireValue::Str("b,70,50,0,5,5|a,90,0,0,5,5".to_string()),
                    WireValue::Int(20)
                ]
            ))
        );
    }

    #[test]
    fn test_detect_to_bmp_reads_output_slots() {
        let gw = CallGateway::new(MockDispatch::new(|_, args| {
            if let Some([.., address, length, _draw]) = args {
                *address = WireValue::Int(0x7ff0_0000);
                *length = WireValue::Int(4096);
            }
            Ok(WireValue::Int(1))
        }));
        let block = AiFunctions::new(&gw)
            .detect_objects_to_bmp(Rect::default(), 0.5, 0.45, true)
            .unwrap();
        assert_eq!(block, MemoryBlock::new(0x7ff0_0000, 4096));
    }

    #[test]
    fn test_model_memory_is_staged() {
        let gw = succeeding();
        AiFunctions::new(&gw)
            .set_yolo_model_memory(2, b"model-bytes", "secret")
            .unwrap();

        let calls = gw.dispatch().calls();
        let args = calls[0].args.clone().unwrap();
        assert_eq!(calls[0].procedure, "AiYoloSetModelMemory");
        assert_eq!(args.len(), 4);
        assert_eq!(args[0], WireValue::Int(2));
        assert_ne!(args[1], WireValue::Int(0));
        assert_eq!(args[2], WireValue::Int(11));
        assert_eq!(args[3], WireValue::Str("secret".to_string()));
    }

    #[test]
    fn test_load_ai_memory_returns_status() {
        let gw = answering("LoadAiMemory", WireValue::Int(-2));
        assert_eq!(AiFunctions::new(&gw).load_ai_memory(b"dll").unwrap(), -2);
    }

    #[test]
    fn test_model_slot_calls() {
        let gw = succeeding();
        let ai = AiFunctions::new(&gw);
        ai.set_yolo_version("v5-7.0").unwrap();
        ai.set_yolo_model(0, "model.dmx", "").unwrap();
        ai.use_yolo_model(0).unwrap();
        ai.free_yolo_model(0).unwrap();
        let procedures: Vec<_> = gw
            .dispatch()
            .calls()
            .into_iter()
            .map(|c| c.procedure)
            .collect();
        assert_eq!(
            procedures,
            vec!["AiYoloSetVersion", "AiYoloSetModel", "AiYoloUseModel", "AiYoloFreeModel"]
        );
    }
}
