//! Fill the rental agreement from the command line
//! Run with: cargo run -p contract --example fill_contract -- <asset-root> <record.json> [landlord.png] [tenant.png]
//!
//! Loads `/edoc/rentalRoomAgreement.pdf` under the asset root, draws the
//! record and any signatures, and writes the result to `output/`.
//! Set `RUST_LOG=debug` to see every placement.

use anyhow::{bail, Context};
use contract::{
    assemble, ContractRecord, FileTemplateLoader, SignatureImage, Signatures, TemplateLoader,
    TEMPLATE_PATH,
};
use std::fs;
use std::path::Path;

fn load_signature(path: Option<&String>) -> anyhow::Result<Option<SignatureImage>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let png = fs::read(path).with_context(|| format!("reading signature {path}"))?;
    Ok(Some(SignatureImage::from_png_bytes(&png)?))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: fill_contract <asset-root> <record.json> [landlord.png] [tenant.png]");
    }

    let template = FileTemplateLoader::new(&args[0]).load(TEMPLATE_PATH)?;
    println!("Template: {} bytes", template.len());

    let json = fs::read_to_string(&args[1]).with_context(|| format!("reading {}", args[1]))?;
    let record = ContractRecord::from_json(&json)?;

    let signatures = Signatures::new(load_signature(args.get(2))?, load_signature(args.get(3))?);

    let document = assemble(&template, &record, &signatures)?;

    fs::create_dir_all("output")?;
    let out = Path::new("output").join(document.file_name());
    fs::write(&out, document.bytes())?;
    println!(
        "{:?}: {} bytes -> {}",
        document.stage(),
        document.bytes().len(),
        out.display()
    );

    Ok(())
}
