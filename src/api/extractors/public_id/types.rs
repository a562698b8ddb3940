/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - decode ロジック / extractor 実装はここに置かない
 */
use super::PublicId;

// exam slots
pub enum ExamSlotTag {}
pub type PublicExamSlotId = PublicId<ExamSlotTag>;

// requests
pub enum RequestTag {}
pub type PublicRequestId = PublicId<RequestTag>;
