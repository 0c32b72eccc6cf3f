//! Integration tests for agreement assembly

use contract::{
    assemble, AssemblyConfig, ContractError, ContractRecord, FieldKey, MemoryDraftStore, Party,
    SignatureImage, SignaturePad, Signatures, Stage, StaticTemplateLoader, Wizard, WizardStep,
    TEMPLATE_PATH,
};
use lopdf::content::{Content, Operation};
use lopdf::dictionary;
use pretty_assertions::assert_eq;

/// Create a blank single-page US Letter template
fn create_template() -> Vec<u8> {
    create_template_with_pages(1)
}

fn create_template_with_pages(count: usize) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<lopdf::Object> = (0..count)
        .map(|_| {
            let contents_id = doc.add_object(lopdf::Stream::new(
                dictionary! {},
                b"0.5 w 150 650 m 400 650 l S\n".to_vec(),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => contents_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn signature(width: u32, height: u32) -> SignatureImage {
    let mut pad = SignaturePad::new(width, height);
    pad.begin_stroke(2.0, height as f32 / 2.0);
    pad.extend_stroke(width as f32 - 2.0, height as f32 / 2.0);
    pad.to_signature(Party::Landlord).unwrap()
}

fn page_operations(pdf: &[u8], page: u32) -> Vec<Operation> {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&page).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

fn operands(op: &Operation) -> Vec<f32> {
    op.operands.iter().map(|o| o.as_float().unwrap()).collect()
}

/// Text drawn by `Tj`, decoded from WinAnsi
fn text_runs(ops: &[Operation]) -> Vec<String> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .map(|op| {
            let bytes = op.operands[0].as_str().unwrap();
            bytes.iter().map(|&b| b as char).collect()
        })
        .collect()
}

/// Baseline positions set by `Td`
fn text_positions(ops: &[Operation]) -> Vec<(f32, f32)> {
    ops.iter()
        .filter(|op| op.operator == "Td")
        .map(|op| {
            let v = operands(op);
            (v[0], v[1])
        })
        .collect()
}

fn image_placements(ops: &[Operation]) -> Vec<Vec<f32>> {
    ops.iter()
        .filter(|op| op.operator == "cm")
        .map(operands)
        .collect()
}

fn full_record() -> ContractRecord {
    ContractRecord {
        property_address: "12 Sukhumvit Rd, Bangkok".to_string(),
        landlord_name: "Somchai Prasert".to_string(),
        tenant_name: "Jane Doe".to_string(),
        contract_start_date: "2026-11-01".to_string(),
        contract_end_date: "2027-10-31".to_string(),
        deposit_amount: "20,000".to_string(),
        monthly_rent: "10,000".to_string(),
        special_conditions: "No pets. Rent is due on the first day of each month.".to_string(),
    }
}

#[test]
fn test_assembly_is_deterministic() {
    let template = create_template();
    let signatures = Signatures::new(Some(signature(200, 80)), Some(signature(120, 40)));

    let first = assemble(&template, &full_record(), &signatures).unwrap();
    let second = assemble(&template, &full_record(), &signatures).unwrap();
    assert_eq!(first.bytes(), second.bytes());
}

#[test]
fn test_only_property_address_draws_one_run() {
    let record = ContractRecord::new().with(FieldKey::PropertyAddress, "12 Sukhumvit Rd");
    let doc = assemble(&create_template(), &record, &Signatures::default()).unwrap();

    let ops = page_operations(doc.bytes(), 1);
    assert_eq!(text_runs(&ops), vec!["12 Sukhumvit Rd".to_string()]);
    assert_eq!(text_positions(&ops), vec![(409.0, 582.0)]);
}

#[test]
fn test_empty_record_draws_nothing() {
    let doc = assemble(&create_template(), &ContractRecord::new(), &Signatures::default()).unwrap();
    let ops = page_operations(doc.bytes(), 1);
    assert!(text_runs(&ops).is_empty());
    assert!(image_placements(&ops).is_empty());
}

#[test]
fn test_all_fields_at_their_positions() {
    let doc = assemble(&create_template(), &full_record(), &Signatures::default()).unwrap();
    let ops = page_operations(doc.bytes(), 1);

    assert_eq!(
        text_positions(&ops),
        vec![
            (164.0, 655.0),
            (165.0, 630.0),
            (409.0, 582.0),
            (319.0, 510.0),
            (235.0, 498.0),
            (297.0, 441.0),
            (206.0, 361.0),
            (175.0, 261.0),
        ]
    );
    assert_eq!(text_runs(&ops)[0], "Somchai Prasert");

    // Every run uses the same font at size 8
    for op in ops.iter().filter(|op| op.operator == "Tf") {
        assert_eq!(op.operands[1].as_float().unwrap(), 8.0);
    }
}

#[test]
fn test_special_conditions_capped_at_four_lines() {
    // 16 "word"s fit on a line measured at size 10, so 81 words need 6 lines
    let text = vec!["word"; 81].join(" ");
    let record = ContractRecord::new().with(FieldKey::SpecialConditions, text);

    let doc = assemble(&create_template(), &record, &Signatures::default()).unwrap();
    let ops = page_operations(doc.bytes(), 1);

    assert_eq!(text_runs(&ops).len(), 4);
    assert_eq!(
        text_positions(&ops),
        vec![(175.0, 261.0), (175.0, 247.0), (175.0, 233.0), (175.0, 219.0)]
    );
}

#[test]
fn test_both_signatures_at_anchors() {
    let signatures = Signatures::new(Some(signature(200, 80)), Some(signature(120, 40)));
    let doc = assemble(&create_template(), &ContractRecord::new(), &signatures).unwrap();

    assert_eq!(doc.stage(), Stage::Signed);
    assert_eq!(doc.file_name(), "rental_agreement_signed.pdf");

    let ops = page_operations(doc.bytes(), 1);
    let placements = image_placements(&ops);
    assert_eq!(placements.len(), 2);

    let expected = [
        [60.0, 0.0, 0.0, 24.0, 165.0, 162.0],
        [36.0, 0.0, 0.0, 12.0, 310.0, 162.0],
    ];
    for (actual, expected) in placements.iter().zip(expected) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }
    assert_eq!(ops.iter().filter(|op| op.operator == "Do").count(), 2);
}

#[test]
fn test_draft_with_one_signature() {
    let signatures = Signatures::new(None, Some(signature(100, 50)));
    let doc = assemble(&create_template(), &full_record(), &signatures).unwrap();

    assert_eq!(doc.stage(), Stage::Draft);
    assert_eq!(doc.file_name(), "rental_agreement.pdf");
    assert_eq!(doc.media_type(), "application/pdf");

    let placements = image_placements(&page_operations(doc.bytes(), 1));
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0][4], 310.0);
}

#[test]
fn test_only_first_page_is_drawn() {
    let template = create_template_with_pages(2);
    let doc = assemble(&template, &full_record(), &Signatures::default()).unwrap();

    assert_eq!(text_runs(&page_operations(doc.bytes(), 1)).len(), 8);
    assert!(text_runs(&page_operations(doc.bytes(), 2)).is_empty());
}

#[test]
fn test_template_content_is_kept() {
    let doc = assemble(&create_template(), &full_record(), &Signatures::default()).unwrap();
    let ops = page_operations(doc.bytes(), 1);
    assert_eq!(ops.iter().filter(|op| op.operator == "S").count(), 1);
}

#[test]
fn test_non_pdf_template() {
    let result = assemble(b"<html>404</html>", &full_record(), &Signatures::default());
    assert!(matches!(result, Err(ContractError::TemplateParse(_))));
}

#[test]
fn test_template_without_pages() {
    let result = assemble(
        &create_template_with_pages(0),
        &full_record(),
        &Signatures::default(),
    );
    assert!(matches!(result, Err(ContractError::TemplateParse(_))));
}

#[test]
fn test_unencodable_text_fails() {
    let record = full_record().with(FieldKey::TenantName, "สมหญิง");
    match assemble(&create_template(), &record, &Signatures::default()) {
        Err(ContractError::TextEncoding { field, character }) => {
            assert_eq!(field, FieldKey::TenantName);
            assert_eq!(character, 'ส');
        }
        other => panic!("Expected TextEncoding, got {other:?}"),
    }
}

#[test]
fn test_latin1_text_is_encoded() {
    let record = ContractRecord::new().with(FieldKey::LandlordName, "José Müller");
    let doc = assemble(&create_template(), &record, &Signatures::default()).unwrap();
    assert_eq!(
        text_runs(&page_operations(doc.bytes(), 1)),
        vec!["José Müller".to_string()]
    );
}

#[test]
fn test_custom_file_names() {
    let config = AssemblyConfig::from_json(r#"{"draftFileName": "preview.pdf"}"#).unwrap();
    let doc = contract::assemble_with_config(
        &create_template(),
        &full_record(),
        &Signatures::default(),
        Stage::Draft,
        &config,
    )
    .unwrap();
    assert_eq!(doc.file_name(), "preview.pdf");
}

#[test]
fn test_wizard_end_to_end() {
    let loader = StaticTemplateLoader::new(TEMPLATE_PATH, create_template());
    let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();

    wizard.submit_record(&full_record()).unwrap();
    let draft = wizard.document_from(&loader).unwrap();
    assert_eq!(draft.stage(), Stage::Draft);
    assert!(image_placements(&page_operations(draft.bytes(), 1)).is_empty());

    let mut pad = SignaturePad::new(200, 80);
    pad.begin_stroke(10.0, 40.0);
    pad.extend_stroke(190.0, 40.0);
    wizard.save_signature(Party::Landlord, &pad).unwrap();
    wizard.save_signature(Party::Tenant, &pad).unwrap();

    // Pending signatures show up in the draft preview
    let preview = wizard.document_from(&loader).unwrap();
    assert_eq!(preview.stage(), Stage::Draft);
    assert_eq!(image_placements(&page_operations(preview.bytes(), 1)).len(), 2);

    assert_eq!(wizard.finalize().unwrap(), WizardStep::Finalize);
    let signed = wizard.document_from(&loader).unwrap();
    assert_eq!(signed.stage(), Stage::Signed);
    assert_eq!(signed.file_name(), "rental_agreement_signed.pdf");
    assert_eq!(text_runs(&page_operations(signed.bytes(), 1)).len(), 8);
}

#[test]
fn test_wizard_missing_template() {
    let loader = StaticTemplateLoader::new("/edoc/other.pdf", create_template());
    let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
    wizard.submit_record(&full_record()).unwrap();

    assert!(matches!(
        wizard.document_from(&loader),
        Err(ContractError::TemplateFetch(_))
    ));
}
