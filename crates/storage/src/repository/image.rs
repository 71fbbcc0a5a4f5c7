use tracing::info;

use crate::backend::ObjectStore;
use crate::dto::image::ImageUpload;
use crate::error::Result;

/// One object-storage bucket holding publicly served images
pub struct ImageBucket<'a> {
    objects: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> ImageBucket<'a> {
    pub fn new(objects: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { objects, bucket }
    }

    /// Store the image under a fresh random name and return its public URL
    pub async fn upload(&self, image: &ImageUpload) -> Result<String> {
        let path = image.object_path();

        self.objects
            .upload(
                self.bucket,
                &path,
                image.bytes().to_vec(),
                image.content_type(),
            )
            .await?;

        info!("Uploaded {} as {}/{}", image.file_name(), self.bucket, path);
        Ok(self.objects.public_url(self.bucket, &path))
    }
}
