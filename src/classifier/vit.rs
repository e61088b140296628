use anyhow::{Context, Result, anyhow};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::vit;
use hf_hub::{Repo, RepoType, api::sync::Api};
use image::RgbImage;
use std::sync::Mutex;

use super::{Classification, ClassifierError, EMOTION_CLASSES, EmotionClassifier, EmotionLabel};

const IMAGE_SIZE: usize = 224;
const NUM_CLASSES: usize = 7;

/// Emotion classifier backed by a face-expression ViT pulled from the
/// Hugging Face hub (7 classes: angry, disgust, fear, happy, neutral,
/// sad, surprise).
///
/// The hub model has no separate face-detection stage, so enforcement is
/// approximated: when `enforce_detection` is set and the top softmax
/// score falls below `min_confidence`, the frame is reported as
/// `NoFaceDetected`.
pub struct VitEmotionClassifier {
    model: Mutex<vit::Model>,
    device: Device,
    min_confidence: f32,
}

impl VitEmotionClassifier {
    pub fn new(model_repo: &str, min_confidence: f32) -> Result<Self> {
        #[cfg(feature = "metal")]
        let device = Device::new_metal(0).unwrap_or(Device::Cpu);
        #[cfg(not(feature = "metal"))]
        let device = Device::Cpu;

        log::info!("[classifier] Loading emotion model {} on {:?}", model_repo, device);

        let api = Api::new()?;
        let repo = api.repo(Repo::new(model_repo.to_string(), RepoType::Model));

        let model_path = repo.get("model.safetensors")?;
        let config_path = repo.get("config.json")?;

        let config: vit::Config = serde_json::from_str(&std::fs::read_to_string(config_path)?)
            .context("invalid model config.json")?;
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[model_path], DType::F32, &device)? };
        let model = vit::Model::new(&config, NUM_CLASSES, vb)?;

        log::info!("[classifier] Emotion model loaded");

        Ok(Self {
            model: Mutex::new(model),
            device,
            min_confidence,
        })
    }

    /// Resize to model input size and normalize to CHW with mean/std 0.5.
    fn preprocess(&self, image: &RgbImage) -> Result<Tensor> {
        let mean = 0.5;
        let std = 0.5;

        let resized = image::imageops::resize(
            image,
            IMAGE_SIZE as u32,
            IMAGE_SIZE as u32,
            image::imageops::FilterType::Triangle,
        );

        let mut data = vec![0f32; 3 * IMAGE_SIZE * IMAGE_SIZE];
        for (i, pixel) in resized.pixels().enumerate() {
            let r = pixel[0] as f32 / 255.0;
            let g = pixel[1] as f32 / 255.0;
            let b = pixel[2] as f32 / 255.0;

            data[i] = (r - mean) / std;
            data[IMAGE_SIZE * IMAGE_SIZE + i] = (g - mean) / std;
            data[2 * IMAGE_SIZE * IMAGE_SIZE + i] = (b - mean) / std;
        }

        let tensor = Tensor::from_vec(data, (1, 3, IMAGE_SIZE, IMAGE_SIZE), &self.device)?;
        Ok(tensor)
    }

    fn run_model(&self, image: &RgbImage) -> Result<Vec<f32>> {
        let input = self.preprocess(image)?;
        let model = self
            .model
            .lock()
            .map_err(|e| anyhow!("model lock poisoned: {}", e))?;
        let logits = model.forward(&input)?;
        let probs = candle_nn::ops::softmax(&logits, 1)?;
        let probs: Vec<f32> = probs.flatten_all()?.to_vec1()?;
        Ok(probs)
    }
}

impl EmotionClassifier for VitEmotionClassifier {
    fn classify(
        &self,
        image: &RgbImage,
        enforce_detection: bool,
    ) -> Result<Classification, ClassifierError> {
        let probs = self.run_model(image)?;

        let scores: Vec<(EmotionLabel, f32)> = EMOTION_CLASSES
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), probs.get(i).copied().unwrap_or(0.0)))
            .collect();

        let (dominant, top_score) = scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, score)| (label.clone(), *score))
            .ok_or_else(|| anyhow!("model returned no scores"))?;

        if enforce_detection && top_score < self.min_confidence {
            log::debug!(
                "[classifier] top score {:.3} below {:.3}, treating as no face",
                top_score,
                self.min_confidence
            );
            return Err(ClassifierError::NoFaceDetected);
        }

        Ok(Classification { dominant, scores })
    }
}
