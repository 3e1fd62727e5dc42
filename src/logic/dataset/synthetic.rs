//! Embedded fallback dataset
//!
//! Fixed schema matching the student questionnaire. Balanced classes and
//! enough rows to pass the training guard.

use super::{loader, Dataset};
use crate::logic::error::PipelineResult;

const SYNTHETIC_CSV: &str = "\
id,Gender,Age,City,Profession,Academic_Pressure,Work_Pressure,CGPA,Study_Satisfaction,Job_Satisfaction,Sleep_Duration,Dietary_Habits,Degree,Have_you_ever_had_suicidal_thoughts,Work_Study_Hours,Financial_Stress,Family_History_of_Mental_Illness,Depression
2,Male,33,Visakhapatnam,Student,5,0,8.97,2,0,5-6 hours,Healthy,B.Pharm,Yes,3,1,No,1
8,Female,24,Bangalore,Student,2,0,5.90,5,0,5-6 hours,Moderate,BSc,No,3,2,Yes,0
26,Male,31,Srinagar,Student,3,0,7.03,5,0,Less than 5 hours,Healthy,BA,No,9,1,Yes,0
30,Female,28,Varanasi,Student,3,0,5.59,2,0,7-8 hours,Moderate,BCA,Yes,4,5,Yes,1
32,Female,25,Jaipur,Student,4,0,8.13,3,0,5-6 hours,Moderate,M.Tech,Yes,1,1,No,0
33,Male,29,Pune,Student,2,0,5.70,3,0,Less than 5 hours,Healthy,PhD,No,4,1,No,0
52,Male,30,Thane,Student,3,0,9.54,4,0,7-8 hours,Healthy,BSc,No,1,2,No,0
56,Female,30,Chennai,Student,2,0,8.04,4,0,Less than 5 hours,Unhealthy,Class 12,No,0,1,Yes,0
59,Male,28,Nagpur,Student,3,0,9.79,1,0,7-8 hours,Moderate,B.Ed,Yes,12,3,No,1
62,Male,21,Nashik,Student,5,0,6.10,3,0,More than 8 hours,Unhealthy,B.Com,Yes,10,5,Yes,1
83,Female,24,Kolkata,Student,5,0,7.25,1,0,Less than 5 hours,Unhealthy,BSc,Yes,11,4,Yes,1
91,Male,19,Delhi,Student,4,0,6.83,2,0,Less than 5 hours,Unhealthy,Class 12,Yes,8,4,No,1
94,Female,22,Mumbai,Student,1,0,8.70,4,0,7-8 hours,Healthy,BA,No,2,1,No,0
100,Male,26,Lucknow,Student,5,0,5.85,1,0,5-6 hours,Unhealthy,MBA,Yes,7,5,Yes,1
103,Female,20,Hyderabad,Student,4,0,6.45,2,0,Less than 5 hours,Moderate,B.Arch,Yes,9,3,No,1
107,Male,27,Ahmedabad,Student,2,0,7.80,5,0,More than 8 hours,Healthy,M.Com,No,5,2,No,0
115,Female,23,Surat,Student,1,0,9.10,5,0,7-8 hours,Healthy,BCA,No,6,1,Yes,0
121,Male,18,Bhopal,Student,5,0,6.20,2,0,Less than 5 hours,Unhealthy,Class 12,Yes,12,4,Yes,1
126,Female,34,Indore,Student,3,0,7.45,3,0,5-6 hours,Moderate,MSc,No,4,2,No,0
134,Male,25,Patna,Student,4,0,5.95,1,0,Less than 5 hours,Unhealthy,B.Tech,Yes,10,5,No,1
140,Female,21,Vadodara,Student,2,0,8.35,4,0,7-8 hours,Moderate,BSc,No,3,3,No,0
148,Male,32,Kanpur,Student,1,0,8.55,5,0,More than 8 hours,Healthy,LLB,No,2,1,No,0
155,Female,19,Ludhiana,Student,5,0,6.65,2,0,5-6 hours,Moderate,Class 12,Yes,11,4,Yes,1
162,Male,22,Agra,Student,4,0,7.10,2,0,Less than 5 hours,Moderate,B.Pharm,Yes,8,5,No,1
";

/// Number of records in the embedded dataset
#[cfg(test)]
pub const SYNTHETIC_ROWS: usize = 24;

pub fn dataset() -> PipelineResult<Dataset> {
    loader::parse_csv(SYNTHETIC_CSV.as_bytes())
}
