use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::future::join_all;
use speedy_core::{FailureKind, ItemId};
use speedy_engine::{
    run_conversion, CodecAdapter, ConversionSettings, DecodeError, EncodeError, EngineEvent,
    EngineHandle, PixelSurface,
};

/// Scripted codec: the first input byte picks the behaviour.
/// `d` fails decoding, `e` fails encoding, `s` stalls, `p` panics, anything
/// else succeeds with an output half the input size.
struct ScriptedCodec;

#[async_trait]
impl CodecAdapter for ScriptedCodec {
    fn target_extension(&self) -> &str {
        "webp"
    }

    async fn decode(&self, bytes: Bytes) -> Result<PixelSurface, DecodeError> {
        match bytes.first() {
            Some(b'd') => Err(DecodeError::Unsupported("tiff/lzw".to_string())),
            Some(b's') => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                unreachable!("stalled codec should have been timed out")
            }
            Some(b'p') => panic!("codec bug"),
            _ => Ok(PixelSurface::new(1, 1, bytes.to_vec())),
        }
    }

    async fn encode(&self, surface: PixelSurface, _quality: f32) -> Result<Bytes, EncodeError> {
        match surface.rgba.first() {
            Some(b'e') => Err(EncodeError::EmptyOutput),
            _ => {
                // Stagger completion so results arrive out of submission order.
                let delay = 5 * (surface.rgba.len() as u64 % 4);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(Bytes::from(vec![0u8; surface.rgba.len() / 2]))
            }
        }
    }
}

fn settings() -> ConversionSettings {
    ConversionSettings {
        quality: 0.85,
        timeout: Some(Duration::from_millis(100)),
    }
}

#[tokio::test]
async fn successful_job_carries_target_extension() {
    let id = ItemId::new("a.png", 0, 8);
    let result = run_conversion(
        &ScriptedCodec,
        &id,
        Bytes::from_static(b"okokokok"),
        &settings(),
    )
    .await;

    let encoded = result.expect("converted");
    assert_eq!(encoded.bytes.len(), 4);
    assert_eq!(encoded.extension, "webp");
}

#[tokio::test]
async fn decode_and_encode_failures_are_told_apart() {
    let id = ItemId::new("x", 0, 1);

    let decode = run_conversion(&ScriptedCodec, &id, Bytes::from_static(b"d"), &settings())
        .await
        .unwrap_err();
    assert_eq!(decode.kind, FailureKind::Decode);
    assert_eq!(
        decode.message,
        "Could not read image: unsupported image format: tiff/lzw"
    );

    let encode = run_conversion(&ScriptedCodec, &id, Bytes::from_static(b"e"), &settings())
        .await
        .unwrap_err();
    assert_eq!(encode.kind, FailureKind::Encode);
    assert_eq!(encode.message, "Could not encode image: encoder returned no data");
}

#[tokio::test]
async fn stalled_codec_times_out() {
    let id = ItemId::new("slow.png", 0, 1);
    let failure = run_conversion(&ScriptedCodec, &id, Bytes::from_static(b"s"), &settings())
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn one_failure_does_not_affect_siblings() {
    let inputs = ["aaaa", "d", "bbbbbb", "e", "cc"];
    let ids: Vec<ItemId> = (0..inputs.len())
        .map(|i| ItemId::new(format!("{i}.png"), 0, 0))
        .collect();
    let settings = settings();

    let results = join_all(
        inputs
            .iter()
            .zip(&ids)
            .map(|(input, id)| {
                run_conversion(&ScriptedCodec, id, Bytes::from_static(input.as_bytes()), &settings)
            }),
    )
    .await;

    let ok: Vec<bool> = results.iter().map(Result::is_ok).collect();
    assert_eq!(ok, vec![true, false, true, false, true]);
}

#[test]
fn engine_settles_every_enqueued_item_once() {
    let engine = EngineHandle::new(Arc::new(ScriptedCodec), settings()).expect("engine");
    let inputs = [
        (ItemId::new("1.png", 0, 3), "one"),
        (ItemId::new("2.png", 0, 1), "d"),
        (ItemId::new("3.png", 0, 5), "three"),
        (ItemId::new("4.png", 0, 1), "s"),
        (ItemId::new("5.png", 0, 4), "five"),
    ];
    for (id, input) in &inputs {
        engine
            .enqueue(id.clone(), Bytes::from_static(input.as_bytes()))
            .expect("engine running");
    }

    let mut settled = HashSet::new();
    while settled.len() < inputs.len() {
        let Some(EngineEvent::JobSettled { id, result }) = engine
            .recv_timeout(Duration::from_secs(5))
            .expect("engine running")
        else {
            panic!("engine stopped producing events after {settled:?}");
        };
        if id.name() == "4.png" {
            assert_eq!(result.unwrap_err().kind, FailureKind::Timeout);
        }
        assert!(settled.insert(id), "item settled twice");
    }
    assert!(engine.try_recv().is_none());
}

#[test]
fn panicking_codec_still_settles_its_item() {
    let engine = EngineHandle::new(Arc::new(ScriptedCodec), settings()).expect("engine");
    let crashing = ItemId::new("crash.png", 0, 1);
    let healthy = ItemId::new("fine.png", 0, 4);
    engine
        .enqueue(crashing.clone(), Bytes::from_static(b"p"))
        .expect("engine running");
    engine
        .enqueue(healthy.clone(), Bytes::from_static(b"fine"))
        .expect("engine running");

    let mut results = Vec::new();
    while results.len() < 2 {
        match engine.recv_timeout(Duration::from_secs(5)).expect("engine running") {
            Some(EngineEvent::JobSettled { id, result }) => results.push((id, result)),
            None => panic!("item never settled after codec panic: {results:?}"),
        }
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let (id, result) = &results[0];
    assert_eq!(*id, crashing);
    assert_eq!(result.as_ref().unwrap_err().kind, FailureKind::Internal);
    assert_eq!(results[1].0, healthy);
    assert!(results[1].1.is_ok());
    assert!(engine.try_recv().is_none());
}
