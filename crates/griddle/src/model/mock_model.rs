use std::fmt::Debug;
use std::sync::Mutex;
use async_trait::async_trait;
use crate::backend::mock_tensor::{MockFloats, MockIds, MockRuntime, MockTensor};
use crate::error::ForwardError;
use crate::model::{Decoder, Encoder};

/// What a mock decoder observed on one call.
#[derive(Debug, Clone)]
pub struct DecoderCall {
    pub input: MockIds,
    pub attention: MockIds,
    pub had_encoder_attention: bool,
}

/// A decoder that emits a scripted token per row per step.
///
/// Once the script runs out the last step is repeated. Earlier sequence positions
/// are filled with a decoy argmax so tests notice if anything reads past the final
/// position.
pub struct ScriptedDecoder {
    steps: Vec<Vec<i64>>,
    vocab: usize,
    fail_at: Option<usize>,
    calls: Mutex<Vec<DecoderCall>>,
}

impl ScriptedDecoder {
    pub fn new(steps: Vec<Vec<i64>>, vocab: usize) -> Self {
        Self {
            steps,
            vocab,
            fail_at: None,
            calls: Mutex::new(vec![]),
        }
    }

    /// Always emits `tokens`.
    pub fn constant(tokens: Vec<i64>, vocab: usize) -> Self {
        Self::new(vec![tokens], vocab)
    }

    /// Fails on the call with index `step` (zero based).
    pub fn failing_at(mut self, step: usize) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn calls(&self) -> Vec<DecoderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Decoder for ScriptedDecoder {
    type Runtime = MockRuntime;

    async fn forward(
        &self,
        _encoder_output: &MockFloats,
        decoder_input: &MockIds,
        decoder_attention: &MockIds,
        encoder_attention: Option<&MockIds>,
    ) -> Result<MockFloats, ForwardError> {
        let step = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(DecoderCall {
                input: decoder_input.clone(),
                attention: decoder_attention.clone(),
                had_encoder_attention: encoder_attention.is_some(),
            });
            calls.len() - 1
        };
        if self.fail_at == Some(step) {
            return Err(format!("scripted failure at step {}", step).into());
        }

        let tokens = &self.steps[step.min(self.steps.len() - 1)];
        let batch = decoder_input.dims()[0];
        let seq = decoder_input.dims()[1];
        let decoy = self.vocab - 1;
        let mut data = vec![0.0f32; batch * seq * self.vocab];
        for b in 0..batch {
            for s in 0..seq {
                let base = (b * seq + s) * self.vocab;
                if s + 1 == seq {
                    data[base + tokens[b] as usize] = 1.0;
                } else {
                    data[base + decoy] = 5.0;
                }
            }
        }
        Ok(MockFloats::new(data, [batch, seq, self.vocab])?)
    }
}

/// What a mock encoder observed on one call.
#[derive(Debug, Clone)]
pub struct EncoderCall {
    pub had_attention: bool,
    pub conditioning: Option<MockFloats>,
}

/// An encoder returning hidden states of a fixed width, filled with `value`.
pub struct ConstantEncoder {
    hidden: usize,
    value: f32,
    fail: bool,
    calls: Mutex<Vec<EncoderCall>>,
}

impl ConstantEncoder {
    pub fn new(hidden: usize, value: f32) -> Self {
        Self {
            hidden,
            value,
            fail: false,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(1, 0.0)
        }
    }

    pub fn calls(&self) -> Vec<EncoderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T> Encoder<MockTensor<T>> for ConstantEncoder
where T: Copy + Debug + Send + Sync + 'static
{
    type Runtime = MockRuntime;

    async fn forward(
        &self,
        input: &MockTensor<T>,
        attention_mask: Option<&MockIds>,
        conditioning: Option<&MockFloats>,
    ) -> Result<MockFloats, ForwardError> {
        self.calls.lock().unwrap().push(EncoderCall {
            had_attention: attention_mask.is_some(),
            conditioning: conditioning.cloned(),
        });
        if self.fail {
            return Err("encoder exploded".into());
        }
        let batch = input.dims()[0];
        Ok(MockFloats::full(self.value, [batch, 1, self.hidden]))
    }
}
