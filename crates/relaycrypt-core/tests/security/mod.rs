mod entropy_quality;
mod masking;
mod zeroize_secrets;
