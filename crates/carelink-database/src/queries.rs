//! 数据库查询操作

use crate::connection::DatabasePool;
use crate::models::*;
use async_trait::async_trait;
use carelink_core::{
    CareError, DoctorProfile, HealthDataStore, HealthRecord, NewRiskAnalysis, PageRequest,
    Patient, PatientProfile, PatientSummary, Prescription, Result, RiskAnalysis, Role, TestResult,
    UserAccount,
};
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

/// 唯一约束冲突的 SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// 患者搜索排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientSort {
    Name,
    Email,
    DateOfBirth,
    BloodGroup,
    CreatedAt,
}

impl PatientSort {
    /// 解析查询参数，未知字段按姓名排序
    pub fn from_param(value: Option<&str>) -> Self {
        match value.unwrap_or("name") {
            "email" => PatientSort::Email,
            "dateOfBirth" => PatientSort::DateOfBirth,
            "bloodGroup" => PatientSort::BloodGroup,
            "createdAt" => PatientSort::CreatedAt,
            _ => PatientSort::Name,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            PatientSort::Name => "u.name",
            PatientSort::Email => "u.email",
            PatientSort::DateOfBirth => "p.date_of_birth",
            PatientSort::BloodGroup => "p.blood_group",
            PatientSort::CreatedAt => "p.created_at",
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// 将用户输入转为 ILIKE 子串匹配模式，转义通配符
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}

const PATIENT_COLUMNS: &str = r#"
    p.id, p.user_id, u.name, u.email, p.date_of_birth, p.blood_group, p.phone, p.allergies, p.created_at
"#;

const HEALTH_RECORD_COLUMNS: &str = r#"
    h.id, h.patient_id, h.doctor_id, du.name AS doctor_name, h.diagnosis, h.symptoms, h.notes, h.visit_date
"#;

/// 数据库查询操作接口
#[derive(Debug, Clone)]
pub struct DatabaseQueries {
    pool: DatabasePool,
}

impl DatabaseQueries {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 用户表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email VARCHAR(255) UNIQUE NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                name VARCHAR(255) NOT NULL,
                role VARCHAR(16) NOT NULL CHECK (role IN ('PATIENT', 'DOCTOR')),
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        // 患者档案表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS patients (
                id UUID PRIMARY KEY,
                user_id UUID UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date_of_birth TIMESTAMP WITH TIME ZONE,
                blood_group VARCHAR(8),
                phone VARCHAR(32),
                allergies TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        // 医生档案表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS doctors (
                id UUID PRIMARY KEY,
                user_id UUID UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                specialization VARCHAR(255),
                license_number VARCHAR(64),
                phone VARCHAR(32),
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        // 就诊记录表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS health_records (
                id UUID PRIMARY KEY,
                patient_id UUID NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                doctor_id UUID NOT NULL REFERENCES doctors(id),
                diagnosis TEXT NOT NULL,
                symptoms TEXT,
                notes TEXT,
                visit_date TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        // 处方表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS prescriptions (
                id UUID PRIMARY KEY,
                health_record_id UUID NOT NULL REFERENCES health_records(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                medication TEXT NOT NULL,
                dosage TEXT,
                frequency TEXT,
                duration TEXT
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        // 检验结果表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS test_results (
                id UUID PRIMARY KEY,
                health_record_id UUID NOT NULL REFERENCES health_records(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                test_name TEXT NOT NULL,
                result TEXT NOT NULL,
                normal_range TEXT,
                test_date TIMESTAMP WITH TIME ZONE
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        // 风险分析表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS ai_analyses (
                id UUID PRIMARY KEY,
                patient_id UUID NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                risk_factors TEXT[] NOT NULL,
                predictions TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                risk_score INTEGER NOT NULL CHECK (risk_score BETWEEN 1 AND 10),
                analyzed_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| CareError::Database(e.to_string()))?;

        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = vec![
            "CREATE INDEX IF NOT EXISTS idx_users_name ON users(name)",
            "CREATE INDEX IF NOT EXISTS idx_health_records_patient_visit ON health_records(patient_id, visit_date DESC)",
            "CREATE INDEX IF NOT EXISTS idx_health_records_doctor_id ON health_records(doctor_id)",
            "CREATE INDEX IF NOT EXISTS idx_prescriptions_record_id ON prescriptions(health_record_id)",
            "CREATE INDEX IF NOT EXISTS idx_test_results_record_id ON test_results(health_record_id)",
            "CREATE INDEX IF NOT EXISTS idx_ai_analyses_patient_analyzed ON ai_analyses(patient_id, analyzed_at DESC)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql)
                .execute(pool)
                .await
                .map_err(|e| CareError::Database(e.to_string()))?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }

    // ========== 用户相关操作 ==========

    /// 根据邮箱查找用户（含密码哈希）
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| CareError::Database(e.to_string()))
    }

    /// 创建用户及其角色档案
    pub async fn create_account(&self, user: &NewUser, profile: &NewProfile) -> Result<UserAccount> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        let db_user = sqlx::query_as::<_, DbUser>(r#"
            INSERT INTO users (id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        "#)
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CareError::Validation("Email already registered".to_string())
            } else {
                CareError::Database(e.to_string())
            }
        })?;

        let (patient, doctor) = match profile {
            NewProfile::Patient(p) => {
                let row = sqlx::query_as::<_, DbPatientProfile>(r#"
                    INSERT INTO patients (id, user_id, date_of_birth, blood_group, phone, allergies)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                "#)
                .bind(Uuid::new_v4())
                .bind(user.id)
                .bind(p.date_of_birth)
                .bind(&p.blood_group)
                .bind(&p.phone)
                .bind(&p.allergies)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| CareError::Database(e.to_string()))?;
                (Some(PatientProfile::from(row)), None)
            }
            NewProfile::Doctor(d) => {
                let row = sqlx::query_as::<_, DbDoctorProfile>(r#"
                    INSERT INTO doctors (id, user_id, specialization, license_number, phone)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                "#)
                .bind(Uuid::new_v4())
                .bind(user.id)
                .bind(&d.specialization)
                .bind(&d.license_number)
                .bind(&d.phone)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| CareError::Database(e.to_string()))?;
                (None, Some(DoctorProfile::from(row)))
            }
        };

        tx.commit()
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        Ok(UserAccount {
            user: db_user.into(),
            patient,
            doctor,
        })
    }

    /// 加载用户的角色档案
    pub async fn load_account(&self, db_user: DbUser) -> Result<UserAccount> {
        let pool = self.pool.pool();
        let user: carelink_core::User = db_user.into();

        let (patient, doctor) = match user.role {
            Role::Patient => {
                let profile = sqlx::query_as::<_, DbPatientProfile>(
                    "SELECT * FROM patients WHERE user_id = $1"
                )
                .bind(user.id)
                .fetch_optional(pool)
                .await
                .map_err(|e| CareError::Database(e.to_string()))?;
                (profile.map(PatientProfile::from), None)
            }
            Role::Doctor => {
                let profile = sqlx::query_as::<_, DbDoctorProfile>(
                    "SELECT * FROM doctors WHERE user_id = $1"
                )
                .bind(user.id)
                .fetch_optional(pool)
                .await
                .map_err(|e| CareError::Database(e.to_string()))?;
                (None, profile.map(DoctorProfile::from))
            }
        };

        Ok(UserAccount { user, patient, doctor })
    }

    // ========== 患者相关操作 ==========

    /// 根据用户ID查找患者
    pub async fn find_patient_by_user_id(&self, user_id: Uuid) -> Result<Option<Patient>> {
        let sql = format!(
            "SELECT {} FROM patients p JOIN users u ON u.id = p.user_id WHERE p.user_id = $1",
            PATIENT_COLUMNS
        );

        let result = sqlx::query_as::<_, DbPatient>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        Ok(result.map(Patient::from))
    }

    /// 根据患者ID查找患者
    pub async fn find_patient_by_id(&self, patient_id: Uuid) -> Result<Option<Patient>> {
        let sql = format!(
            "SELECT {} FROM patients p JOIN users u ON u.id = p.user_id WHERE p.id = $1",
            PATIENT_COLUMNS
        );

        let result = sqlx::query_as::<_, DbPatient>(&sql)
            .bind(patient_id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        Ok(result.map(Patient::from))
    }

    /// 按姓名或邮箱搜索患者，返回当前页与总数
    pub async fn search_patients(
        &self,
        query: &str,
        sort: PatientSort,
        order: SortOrder,
        page: &PageRequest,
    ) -> Result<(Vec<PatientSummary>, i64)> {
        let pool = self.pool.pool();
        let query = query.trim();
        let pattern = like_pattern(query);

        let sql = format!(r#"
            SELECT p.id, u.name, u.email, p.date_of_birth, p.blood_group, p.phone, p.allergies,
                   (SELECT MAX(h.visit_date) FROM health_records h WHERE h.patient_id = p.id) AS last_visit,
                   NULL::BIGINT AS total_visits
            FROM patients p
            JOIN users u ON u.id = p.user_id
            WHERE ($1 = '' OR u.name ILIKE $2 OR u.email ILIKE $2)
            ORDER BY {} {} NULLS LAST, p.id
            LIMIT $3 OFFSET $4
        "#, sort.column(), order.keyword());

        let rows = sqlx::query_as::<_, DbPatientSummary>(&sql)
            .bind(query)
            .bind(&pattern)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        let total: i64 = sqlx::query(r#"
            SELECT COUNT(*) AS total
            FROM patients p
            JOIN users u ON u.id = p.user_id
            WHERE ($1 = '' OR u.name ILIKE $2 OR u.email ILIKE $2)
        "#)
        .bind(query)
        .bind(&pattern)
        .fetch_one(pool)
        .await
        .map(|row| row.get("total"))
        .map_err(|e| CareError::Database(e.to_string()))?;

        Ok((rows.into_iter().map(PatientSummary::from).collect(), total))
    }

    /// 医生接诊过的患者（按最近就诊时间倒序），返回当前页与总数
    pub async fn patients_for_doctor(
        &self,
        doctor_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<PatientSummary>, i64)> {
        let pool = self.pool.pool();

        let rows = sqlx::query_as::<_, DbPatientSummary>(r#"
            SELECT p.id, u.name, u.email, p.date_of_birth, p.blood_group, p.phone, p.allergies,
                   MAX(h.visit_date) AS last_visit,
                   COUNT(h.id) AS total_visits
            FROM health_records h
            JOIN patients p ON p.id = h.patient_id
            JOIN users u ON u.id = p.user_id
            WHERE h.doctor_id = $1
            GROUP BY p.id, u.id
            ORDER BY last_visit DESC, p.id
            LIMIT $2 OFFSET $3
        "#)
        .bind(doctor_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(DISTINCT patient_id) AS total FROM health_records WHERE doctor_id = $1"
        )
        .bind(doctor_id)
        .fetch_one(pool)
        .await
        .map(|row| row.get("total"))
        .map_err(|e| CareError::Database(e.to_string()))?;

        Ok((rows.into_iter().map(PatientSummary::from).collect(), total))
    }

    // ========== 医生相关操作 ==========

    /// 根据用户ID查找医生档案
    pub async fn find_doctor_by_user_id(&self, user_id: Uuid) -> Result<Option<DoctorProfile>> {
        let result = sqlx::query_as::<_, DbDoctorProfile>(
            "SELECT * FROM doctors WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        Ok(result.map(DoctorProfile::from))
    }

    // ========== 就诊记录相关操作 ==========

    /// 获取患者就诊记录（按就诊时间倒序）
    pub async fn health_records_for_patient(
        &self,
        patient_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HealthRecord>> {
        let sql = format!(r#"
            SELECT {}
            FROM health_records h
            LEFT JOIN doctors d ON d.id = h.doctor_id
            LEFT JOIN users du ON du.id = d.user_id
            WHERE h.patient_id = $1
            ORDER BY h.visit_date DESC
            LIMIT $2
        "#, HEALTH_RECORD_COLUMNS);

        let rows = sqlx::query_as::<_, DbHealthRecord>(&sql)
            .bind(patient_id)
            .bind(limit)
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        self.attach_children(rows).await
    }

    /// 根据ID获取就诊记录
    pub async fn health_record_by_id(&self, record_id: Uuid) -> Result<Option<HealthRecord>> {
        let sql = format!(r#"
            SELECT {}
            FROM health_records h
            LEFT JOIN doctors d ON d.id = h.doctor_id
            LEFT JOIN users du ON du.id = d.user_id
            WHERE h.id = $1
        "#, HEALTH_RECORD_COLUMNS);

        let row = sqlx::query_as::<_, DbHealthRecord>(&sql)
            .bind(record_id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        match row {
            Some(row) => Ok(self.attach_children(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// 批量加载处方与检验结果并组装记录
    async fn attach_children(&self, rows: Vec<DbHealthRecord>) -> Result<Vec<HealthRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.pool.pool();
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let prescriptions = sqlx::query_as::<_, DbPrescription>(
            "SELECT * FROM prescriptions WHERE health_record_id = ANY($1) ORDER BY position"
        )
        .bind(&ids)
        .fetch_all(pool)
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        let test_results = sqlx::query_as::<_, DbTestResult>(
            "SELECT * FROM test_results WHERE health_record_id = ANY($1) ORDER BY position"
        )
        .bind(&ids)
        .fetch_all(pool)
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        let mut prescriptions_by_record: HashMap<Uuid, Vec<Prescription>> = HashMap::new();
        for p in prescriptions {
            prescriptions_by_record
                .entry(p.health_record_id)
                .or_default()
                .push(p.into());
        }

        let mut results_by_record: HashMap<Uuid, Vec<TestResult>> = HashMap::new();
        for t in test_results {
            results_by_record
                .entry(t.health_record_id)
                .or_default()
                .push(t.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let prescriptions = prescriptions_by_record.remove(&row.id).unwrap_or_default();
                let test_results = results_by_record.remove(&row.id).unwrap_or_default();
                row.into_record(prescriptions, test_results)
            })
            .collect())
    }

    /// 创建就诊记录及其处方、检验结果
    pub async fn create_health_record(&self, record: &NewHealthRecord) -> Result<HealthRecord> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        let record_id = Uuid::new_v4();

        sqlx::query(r#"
            INSERT INTO health_records (id, patient_id, doctor_id, diagnosis, symptoms, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#)
        .bind(record_id)
        .bind(record.patient_id)
        .bind(record.doctor_id)
        .bind(&record.diagnosis)
        .bind(&record.symptoms)
        .bind(&record.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        for (position, p) in record.prescriptions.iter().enumerate() {
            sqlx::query(r#"
                INSERT INTO prescriptions (id, health_record_id, position, medication, dosage, frequency, duration)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#)
            .bind(Uuid::new_v4())
            .bind(record_id)
            .bind(position as i32)
            .bind(&p.medication)
            .bind(&p.dosage)
            .bind(&p.frequency)
            .bind(&p.duration)
            .execute(&mut *tx)
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;
        }

        for (position, t) in record.test_results.iter().enumerate() {
            sqlx::query(r#"
                INSERT INTO test_results (id, health_record_id, position, test_name, result, normal_range, test_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#)
            .bind(Uuid::new_v4())
            .bind(record_id)
            .bind(position as i32)
            .bind(&t.test_name)
            .bind(&t.result)
            .bind(&t.normal_range)
            .bind(t.test_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        tracing::info!(
            "Health record {} created for patient {} by doctor {}",
            record_id, record.patient_id, record.doctor_id
        );

        self.health_record_by_id(record_id)
            .await?
            .ok_or_else(|| CareError::Internal(format!("Health record {} vanished after insert", record_id)))
    }

    // ========== 风险分析相关操作 ==========

    /// 保存风险分析
    pub async fn insert_risk_analysis(&self, analysis: &NewRiskAnalysis) -> Result<RiskAnalysis> {
        let row = sqlx::query_as::<_, DbRiskAnalysis>(r#"
            INSERT INTO ai_analyses (id, patient_id, risk_factors, predictions, recommendations, risk_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        "#)
        .bind(Uuid::new_v4())
        .bind(analysis.patient_id)
        .bind(&analysis.risk_factors)
        .bind(&analysis.predictions)
        .bind(&analysis.recommendations)
        .bind(analysis.risk_score)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        Ok(row.into())
    }

    /// 最近的风险分析（按分析时间倒序）
    pub async fn recent_risk_analyses(&self, patient_id: Uuid, limit: i64) -> Result<Vec<RiskAnalysis>> {
        let rows = sqlx::query_as::<_, DbRiskAnalysis>(
            "SELECT * FROM ai_analyses WHERE patient_id = $1 ORDER BY analyzed_at DESC LIMIT $2"
        )
        .bind(patient_id)
        .bind(limit)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| CareError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(RiskAnalysis::from).collect())
    }

    /// 最近一次风险分析
    pub async fn latest_risk_analysis(&self, patient_id: Uuid) -> Result<Option<RiskAnalysis>> {
        Ok(self.recent_risk_analyses(patient_id, 1).await?.into_iter().next())
    }
}

#[async_trait]
impl HealthDataStore for DatabaseQueries {
    async fn find_patient_by_user(&self, user_id: Uuid) -> Result<Option<Patient>> {
        self.find_patient_by_user_id(user_id).await
    }

    async fn health_records_for_patient(
        &self,
        patient_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HealthRecord>> {
        DatabaseQueries::health_records_for_patient(self, patient_id, limit).await
    }

    async fn insert_risk_analysis(&self, analysis: &NewRiskAnalysis) -> Result<RiskAnalysis> {
        DatabaseQueries::insert_risk_analysis(self, analysis).await
    }
}
