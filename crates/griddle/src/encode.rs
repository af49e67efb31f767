//! # Encode Dispatch
//!
//! Produces the single hidden-state tensor that conditions the decoder, from an
//! image encoder, a text encoder, or both. When both are present the image is
//! encoded first and its hidden states are handed to the text encoder as
//! conditioning, so the text encoder's output is the fused result.
//!
//! Nothing is cached: every call runs the encoders again.

use tracing::debug;
use crate::backend::{Backend, Floats, Ids, Pixels, Runtime};
use crate::error::{GenerationError, Result, Stage};
use crate::model::Encoder;

/// Inputs for the encode step.
///
/// Each input only matters if the matching encoder is supplied.
pub struct EncodeInputs<R>
where R: Runtime
{
    /// Pixel values for the image encoder
    pub image: Option<Pixels<R>>,
    pub image_attention: Option<Ids<R>>,
    /// Token ids for the text encoder
    pub text: Option<Ids<R>>,
    pub text_attention: Option<Ids<R>>,
}

impl<R> Default for EncodeInputs<R>
where R: Runtime
{
    fn default() -> Self {
        Self {
            image: None,
            image_attention: None,
            text: None,
            text_attention: None,
        }
    }
}

impl<R> Clone for EncodeInputs<R>
where R: Runtime
{
    fn clone(&self) -> Self {
        Self {
            image: self.image.clone(),
            image_attention: self.image_attention.clone(),
            text: self.text.clone(),
            text_attention: self.text_attention.clone(),
        }
    }
}

impl<R> EncodeInputs<R>
where R: Runtime
{
    pub fn image(image: Pixels<R>) -> Self {
        Self {
            image: Some(image),
            ..Default::default()
        }
    }

    pub fn text(text: Ids<R>) -> Self {
        Self {
            text: Some(text),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Pixels<R>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_image_attention(mut self, attention: Ids<R>) -> Self {
        self.image_attention = Some(attention);
        self
    }

    pub fn with_text(mut self, text: Ids<R>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_text_attention(mut self, attention: Ids<R>) -> Self {
        self.text_attention = Some(attention);
        self
    }
}

/// Runs the supplied encoders and returns the hidden states for the decoder.
///
/// # Parameters
///
/// * `image_encoder` - Optional image encoder, run on `inputs.image`
/// * `text_encoder` - Optional text encoder, run on `inputs.text`, conditioned on the
///   image encoder's output when both are supplied
/// * `inputs` - The modality inputs and their attention masks
///
/// # Errors
///
/// * [`GenerationError::Configuration`] if neither encoder is supplied, or an encoder is
///   supplied without its input. Both checks happen before any forward pass.
/// * [`GenerationError::ForwardPass`] if an encoder fails.
pub async fn encode<R>(
    image_encoder: Option<&dyn Encoder<Pixels<R>, Runtime = R>>,
    text_encoder: Option<&dyn Encoder<Ids<R>, Runtime = R>>,
    inputs: &EncodeInputs<R>,
) -> Result<Floats<R>>
where R: Runtime
{
    if image_encoder.is_none() && text_encoder.is_none() {
        return Err(GenerationError::Configuration(
            "at least one encoder must be provided".into(),
        ));
    }
    let image = match image_encoder {
        Some(encoder) => {
            let input = inputs.image.as_ref().ok_or_else(|| {
                GenerationError::Configuration("image encoder supplied without image input".into())
            })?;
            Some((encoder, input))
        }
        None => None,
    };
    let text = match text_encoder {
        Some(encoder) => {
            let input = inputs.text.as_ref().ok_or_else(|| {
                GenerationError::Configuration("text encoder supplied without text input".into())
            })?;
            Some((encoder, input))
        }
        None => None,
    };

    let mut image_output = None;
    if let Some((encoder, input)) = image {
        debug!(shape = ?input.shape(), "running image encoder");
        let output = encoder
            .forward(input, inputs.image_attention.as_ref(), None)
            .await
            .map_err(|e| GenerationError::forward(Stage::ImageEncoder, e))?;
        image_output = Some(output);
    }

    match (text, image_output) {
        (Some((encoder, input)), image_output) => {
            debug!(
                shape = ?input.shape(),
                conditioned = image_output.is_some(),
                "running text encoder"
            );
            encoder
                .forward(input, inputs.text_attention.as_ref(), image_output.as_ref())
                .await
                .map_err(|e| GenerationError::forward(Stage::TextEncoder, e))
        }
        (None, Some(image_output)) => Ok(image_output),
        (None, None) => Err(GenerationError::Configuration(
            "at least one encoder must be provided".into(),
        )),
    }
}
